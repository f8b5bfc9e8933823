// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::json;
use tracing::debug;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::metrics;

/// Read-only contract call seam. Implementations take pre-encoded call data
/// and return raw return data; typed encoding and decoding live in
/// `chain::contracts`. No caching and no retries here: every call is a
/// fresh round-trip, and retry policy belongs to callers.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(&self, contract: Address, function: &str, data: Vec<u8>)
        -> Result<Vec<u8>>;
}

/// `eth_call`-based reader against a single configured node.
pub struct EthRpcClient {
    client: HttpClient,
    timeout_ms: u64,
}

impl EthRpcClient {
    pub fn new(rpc_url: &str, timeout_ms: u64) -> Result<Self, anyhow::Error> {
        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_millis(timeout_ms))
            .build(rpc_url)?;
        Ok(Self { client, timeout_ms })
    }
}

#[async_trait]
impl ContractReader for EthRpcClient {
    async fn call(&self, contract: Address, function: &str, data: Vec<u8>)
        -> Result<Vec<u8>>
    {
        metrics::CONTRACT_CALLS.with_label_values(&[function]).inc();
        debug!(contract = %contract, function, "issuing eth_call");

        let call_object = json!({
            "to": contract.checksummed(),
            "data": format!("0x{}", hex::encode(&data)),
        });

        let request = self
            .client
            .request::<String, _>("eth_call", rpc_params![call_object, "latest"]);

        let response = tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            request,
        )
        .await
        .map_err(|_| {
            metrics::CONTRACT_CALL_FAILURES.with_label_values(&[function]).inc();
            Error::Timeout {
                operation: format!("eth_call {function}"),
                timeout_ms: self.timeout_ms,
            }
        })?
        .map_err(|e| {
            metrics::CONTRACT_CALL_FAILURES.with_label_values(&[function]).inc();
            Error::contract_call(contract.checksummed(), function, e.to_string())
        })?;

        let stripped = response.strip_prefix("0x").unwrap_or(&response);
        hex::decode(stripped).map_err(|e| {
            metrics::CONTRACT_CALL_FAILURES.with_label_values(&[function]).inc();
            Error::contract_call(
                contract.checksummed(),
                function,
                format!("node returned non-hex data: {e}"),
            )
        })
    }
}
