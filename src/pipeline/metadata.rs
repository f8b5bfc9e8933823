// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::address::Address;
use crate::chain::CoreMetadataViewModule;
use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{IpAsset, IpMetadata, NftTokenMetadata};

/// Off-chain fetch seam. The HTTP implementation is the production path;
/// tests substitute canned documents.
#[async_trait]
pub trait UriFetcher: Send + Sync {
    async fn fetch_json(&self, uri: &str) -> Result<serde_json::Value>;
}

/// Plain unauthenticated HTTP GET with a bounded timeout; `ipfs://` URIs
/// are rewritten to the configured public gateway first.
pub struct HttpFetcher {
    client: reqwest::Client,
    gateway: String,
    timeout_ms: u64,
}

impl HttpFetcher {
    pub fn new(gateway: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway: gateway.into(),
            timeout_ms,
        }
    }

    /// `ipfs://<cid>` becomes `<gateway>/ipfs/<cid>`; everything else
    /// passes through untouched.
    pub fn to_gateway_url(&self, uri: &str) -> String {
        match uri.strip_prefix("ipfs://") {
            Some(cid) => format!("{}/ipfs/{}", self.gateway.trim_end_matches('/'), cid),
            None => uri.to_string(),
        }
    }
}

#[async_trait]
impl UriFetcher for HttpFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<serde_json::Value> {
        let url = self.to_gateway_url(uri);
        debug!(%url, "fetching off-chain metadata");

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                metrics::METADATA_FETCHES.with_label_values(&["error"]).inc();
                if e.is_timeout() {
                    Error::Timeout {
                        operation: format!("fetch {uri}"),
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    Error::MetadataFetch { uri: uri.to_string(), reason: e.to_string() }
                }
            })?;

        if !response.status().is_success() {
            metrics::METADATA_FETCHES.with_label_values(&["error"]).inc();
            return Err(Error::MetadataFetch {
                uri: uri.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let body = response.json().await.map_err(|e| {
            metrics::METADATA_FETCHES.with_label_values(&["error"]).inc();
            Error::MetadataFetch {
                uri: uri.to_string(),
                reason: format!("body is not JSON: {e}"),
            }
        })?;
        metrics::METADATA_FETCHES.with_label_values(&["ok"]).inc();
        Ok(body)
    }
}

/// Resolves one IP asset id into a displayable `IpAsset`: core metadata
/// from the view module, then both off-chain documents it points at. Chain
/// failures and fetch failures keep their distinct kinds so callers can
/// tell "metadata missing" from "chain error".
pub struct MetadataResolver {
    view: CoreMetadataViewModule,
    fetcher: Arc<dyn UriFetcher>,
}

impl MetadataResolver {
    pub fn new(view: CoreMetadataViewModule, fetcher: Arc<dyn UriFetcher>) -> Self {
        Self { view, fetcher }
    }

    pub async fn resolve(&self, ip_id: Address) -> Result<IpAsset> {
        let core = self.view.get_core_metadata(ip_id).await?;

        if core.nft_token_uri.is_empty() {
            return Err(Error::MetadataFetch {
                uri: ip_id.checksummed(),
                reason: "ip asset has no token URI".to_string(),
            });
        }

        let token = self.fetch_token_metadata(&core.nft_token_uri).await?;
        let ip = self.fetch_ip_metadata(&core.metadata_uri).await?;

        Ok(IpAsset::from_parts(ip_id, core, token, ip))
    }

    /// The on-chain owner of the asset, for caller-side ownership checks.
    pub async fn owner_of(&self, ip_id: Address) -> Result<Address> {
        self.view.get_owner(ip_id).await
    }

    async fn fetch_token_metadata(&self, uri: &str) -> Result<NftTokenMetadata> {
        let body = self.fetcher.fetch_json(uri).await?;
        serde_json::from_value(body).map_err(|_| Error::MetadataFetch {
            uri: uri.to_string(),
            reason: "token metadata is missing 'name' or 'image'".to_string(),
        })
    }

    async fn fetch_ip_metadata(&self, uri: &str) -> Result<IpMetadata> {
        let body = self.fetcher.fetch_json(uri).await?;
        serde_json::from_value(body).map_err(|_| Error::MetadataFetch {
            uri: uri.to_string(),
            reason: "ip metadata is missing 'title', 'description' or 'attributes'"
                .to_string(),
        })
    }
}
