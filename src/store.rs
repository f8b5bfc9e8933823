// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

//! Owner-contract directory: which NFT collection a wallet owns. One
//! collection per owner; `set` overwrites any prior value and the last
//! writer wins. Keys are always checksummed addresses, so casing never
//! produces two entries for the same wallet.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::address::Address;
use crate::error::{Error, Result};

/// Persistence seam for the directory. The file implementation below is
/// the baseline; anything keyed get/set (embedded DB, managed table) can
/// stand in without touching callers.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// The collection registered for `owner`, if any. A missing key is a
    /// well-defined absence signalling the onboarding flow, not an error.
    async fn get(&self, owner: Address) -> Result<Option<Address>>;

    /// Register `contract` as the collection for `owner`, overwriting any
    /// prior value.
    async fn set(&self, owner: Address, contract: Address) -> Result<()>;

    /// Snapshot of the whole directory, checksummed key to contract.
    async fn all(&self) -> Result<BTreeMap<String, String>>;
}

/// Directory backed by a single JSON object on disk
/// (`{ "0xOwner...": "0xCollection...", ... }`). Reads and writes go
/// through one mutex; a write is a full read-modify-rewrite of the file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Persistence(format!(
                    "{} holds malformed JSON: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(BTreeMap::new())
            }
            Err(e) => Err(Error::Persistence(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn persist(&self, owners: &BTreeMap<String, String>) -> Result<()> {
        let body = serde_json::to_vec_pretty(owners)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            Error::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl DirectoryStore for JsonFileStore {
    async fn get(&self, owner: Address) -> Result<Option<Address>> {
        let _guard = self.lock.lock().await;
        let owners = self.load().await?;
        let Some(raw) = owners.get(&owner.checksummed()) else {
            debug!(owner = %owner, "owner has no registered collection");
            return Ok(None);
        };
        match raw.parse() {
            Ok(contract) => Ok(Some(contract)),
            Err(_) => {
                warn!(owner = %owner, value = %raw, "directory holds a malformed contract address");
                Err(Error::Persistence(format!(
                    "stored contract for {owner} is not a valid address"
                )))
            }
        }
    }

    async fn set(&self, owner: Address, contract: Address) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut owners = self.load().await?;
        owners.insert(owner.checksummed(), contract.checksummed());
        self.persist(&owners).await?;
        debug!(owner = %owner, contract = %contract, "registered collection");
        Ok(())
    }

    async fn all(&self) -> Result<BTreeMap<String, String>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }
}

/// Volatile directory for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    owners: Mutex<BTreeMap<Address, Address>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get(&self, owner: Address) -> Result<Option<Address>> {
        Ok(self.owners.lock().await.get(&owner).copied())
    }

    async fn set(&self, owner: Address, contract: Address) -> Result<()> {
        self.owners.lock().await.insert(owner, contract);
        Ok(())
    }

    async fn all(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .owners
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.checksummed(), v.checksummed()))
            .collect())
    }
}
