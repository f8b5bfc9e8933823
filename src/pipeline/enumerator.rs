// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::address::Address;
use crate::chain::{ContractReader, IpAssetRegistry, SpgNftContract};
use crate::error::{Error, Result};

/// One enumerated token: its one-based index in the owner's holdings and
/// the IP asset account derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumeratedAsset {
    pub token_id: u64,
    pub ip_id: Address,
}

/// Discovers the IP assets an owner registered through a collection:
/// `balanceOf` for the count, then the registry's `ipId` derivation per
/// token index. Index lookups run concurrently up to `max_concurrent`
/// and the result is re-sorted into increasing token-index order.
pub struct AssetEnumerator {
    reader: Arc<dyn ContractReader>,
    registry: IpAssetRegistry,
    chain_id: u64,
    max_concurrent: usize,
}

impl AssetEnumerator {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        registry: IpAssetRegistry,
        chain_id: u64,
        max_concurrent: usize,
    ) -> Self {
        Self { reader, registry, chain_id, max_concurrent: max_concurrent.max(1) }
    }

    /// All IP asset ids for `owner` in `collection`, in token-index order.
    ///
    /// Zero owned tokens is `NoAssetsFound`, which callers treat as a
    /// legitimate empty state. Any failing index lookup fails the whole
    /// enumeration; partial listings are never returned.
    pub async fn list_asset_ids(
        &self,
        collection: Address,
        owner: Address,
    ) -> Result<Vec<EnumeratedAsset>> {
        let contract = SpgNftContract::new(collection, Arc::clone(&self.reader));
        let balance = contract.balance_of(owner).await?;
        debug!(%owner, %collection, balance, "enumerating owned tokens");

        if balance == 0 {
            return Err(Error::NoAssetsFound {
                owner: owner.checksummed(),
                collection: collection.checksummed(),
            });
        }

        let lookups = stream::iter((1..=balance).map(|token_id| {
            let registry = self.registry.clone();
            let chain_id = self.chain_id;
            async move {
                let ip_id = registry.ip_id(chain_id, collection, token_id).await?;
                Ok::<_, Error>(EnumeratedAsset { token_id, ip_id })
            }
        }))
        .buffer_unordered(self.max_concurrent)
        .collect::<Vec<_>>()
        .await;

        let mut assets = lookups.into_iter().collect::<Result<Vec<_>>>()?;
        assets.sort_by_key(|asset| asset.token_id);
        Ok(assets)
    }
}
