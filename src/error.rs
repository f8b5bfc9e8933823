// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Failure kinds surfaced by the read pipeline. Each kind maps to a distinct
/// user-facing message at the API layer; none of them is ever swallowed
/// without a logged diagnostic.
#[derive(Debug, Error)]
pub enum Error {
    /// Node-level or contract-level read failure: unreachable RPC endpoint,
    /// reverted call, or a result that does not decode into the expected
    /// shape.
    #[error("contract call {function} on {contract} failed: {reason}")]
    ContractCall {
        contract: String,
        function: String,
        reason: String,
    },

    /// Off-chain URI unreachable, non-2xx, or missing required fields.
    #[error("failed to fetch metadata from {uri}: {reason}")]
    MetadataFetch { uri: String, reason: String },

    /// Chain read failure while resolving attached license terms.
    #[error("failed to fetch license terms for {ip_id}: {reason}")]
    LicenseFetch { ip_id: String, reason: String },

    /// Owner-directory backing store could not be read or written.
    #[error("owner directory store failure: {0}")]
    Persistence(String),

    /// The owner holds no tokens in the collection. A legitimate empty
    /// state, not a lookup failure.
    #[error("no assets found for {owner} in collection {collection}")]
    NoAssetsFound { owner: String, collection: String },

    /// A network call exceeded its configured bound.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Missing or invalid API key on a write endpoint.
    #[error("missing or invalid API key")]
    Authorization,

    /// Pinning service rejected the upload or is not configured.
    #[error("pinning service failure: {0}")]
    Pinning(String),

    /// Malformed address in request input.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    pub fn contract_call(
        contract: impl Into<String>,
        function: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ContractCall {
            contract: contract.into(),
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Rewrap a chain read failure as a license aggregation failure.
    /// Timeouts keep their own kind so the caller can still tell a slow
    /// node from a failed read.
    pub fn into_license_fetch(self, ip_id: &str) -> Self {
        match self {
            Error::Timeout { .. } => self,
            other => Error::LicenseFetch {
                ip_id: ip_id.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
