// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Client for the Pinata pinning API, authenticated with the configured
/// JWT. Only the two pin operations the upload endpoint needs.
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(api_url: impl Into<String>, jwt: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            jwt: jwt.into(),
        }
    }

    /// Pin a JSON document, returning its content hash.
    pub async fn pin_json(&self, body: &serde_json::Value) -> Result<String> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.api_url);
        debug!("pinning JSON document");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.jwt)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Pinning(e.to_string()))?;
        Self::decode(response).await
    }

    /// Pin a raw file under its original name, returning its content hash.
    pub async fn pin_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        debug!(file_name, size = bytes.len(), "pinning file");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Pinning(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "pinning service rejected the upload");
            return Err(Error::Pinning(format!("status {status}: {body}")));
        }
        let pin: PinResponse = response
            .json()
            .await
            .map_err(|e| Error::Pinning(format!("unexpected response shape: {e}")))?;
        Ok(pin.ipfs_hash)
    }
}
