// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::Address;
use crate::error::{Error, Result};
use crate::models::{IpAsset, License, NON_COMMERCIAL_TERMS_ID};
use crate::pipeline::enumerator::AssetEnumerator;
use crate::pipeline::license::LicenseAggregator;
use crate::pipeline::metadata::MetadataResolver;
use crate::store::DirectoryStore;

/// One gallery entry: the resolved asset joined with its license terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(flatten)]
    pub asset: IpAsset,
    pub licenses: Vec<License>,
}

impl GalleryItem {
    /// Whether the asset carries any license beyond the non-commercial
    /// default, judged by its first attached terms id as the views do.
    pub fn is_commercial(&self) -> bool {
        self.licenses
            .first()
            .map(|license| license.id != NON_COMMERCIAL_TERMS_ID.to_string())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryView {
    pub owner: Address,
    pub collection: Address,
    pub items: Vec<GalleryItem>,
}

/// Outcome of a my-assets assembly. The three non-failure states are
/// distinct on purpose: "no collection yet" starts the onboarding flow,
/// "no assets" renders an empty gallery, and only real failures render as
/// errors.
#[derive(Debug, Clone)]
pub enum GalleryOutcome {
    NoCollection,
    NoAssets { collection: Address },
    Assets(GalleryView),
}

/// The my-assets read path: directory lookup, enumeration, then metadata
/// and license resolution per asset with bounded fan-out. Per-asset joins
/// run concurrently; the merged result is re-sorted into token-index
/// order before it is returned.
pub struct GalleryService {
    directory: Arc<dyn DirectoryStore>,
    enumerator: AssetEnumerator,
    resolver: Arc<MetadataResolver>,
    aggregator: Arc<LicenseAggregator>,
    max_concurrent: usize,
}

impl GalleryService {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        enumerator: AssetEnumerator,
        resolver: Arc<MetadataResolver>,
        aggregator: Arc<LicenseAggregator>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            directory,
            enumerator,
            resolver,
            aggregator,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn my_assets(&self, owner: Address) -> Result<GalleryOutcome> {
        let Some(collection) = self.directory.get(owner).await? else {
            info!(%owner, "no collection registered, onboarding required");
            return Ok(GalleryOutcome::NoCollection);
        };

        let enumerated = match self.enumerator.list_asset_ids(collection, owner).await {
            Ok(assets) => assets,
            Err(Error::NoAssetsFound { .. }) => {
                debug!(%owner, %collection, "collection holds no tokens for owner");
                return Ok(GalleryOutcome::NoAssets { collection });
            }
            Err(e) => return Err(e),
        };

        let joined = stream::iter(enumerated.into_iter().map(|entry| {
            let resolver = Arc::clone(&self.resolver);
            let aggregator = Arc::clone(&self.aggregator);
            async move {
                let mut asset = resolver.resolve(entry.ip_id).await?;
                asset.token_id = Some(entry.token_id);
                asset.token_contract = Some(collection);
                let licenses = aggregator.list_license_terms(entry.ip_id).await?;
                Ok::<_, Error>(GalleryItem { asset, licenses })
            }
        }))
        .buffer_unordered(self.max_concurrent)
        .collect::<Vec<_>>()
        .await;

        let mut items = joined.into_iter().collect::<Result<Vec<_>>>()?;
        items.sort_by_key(|item| item.asset.token_id);
        info!(%owner, %collection, assets = items.len(), "assembled gallery view");

        Ok(GalleryOutcome::Assets(GalleryView { owner, collection, items }))
    }
}

/// Keep only assets carrying a commercial license, mirroring the gallery's
/// "commercial only" toggle.
pub fn commercial_only(items: Vec<GalleryItem>) -> Vec<GalleryItem> {
    items.into_iter().filter(GalleryItem::is_commercial).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::abi::enc;
    use crate::chain::contracts::testenc;
    use crate::chain::{
        ContractReader, CoreMetadata, CoreMetadataViewModule, IpAssetRegistry,
        LicenseRegistry, PilLicenseTemplate, PilTerms,
    };
    use crate::pipeline::metadata::UriFetcher;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    /// A whole scripted chain: two owned tokens, asset ids derived from
    /// the token index, each with one attached license.
    struct ScriptedChain {
        balance: u64,
        attached_terms_id: u64,
    }

    #[async_trait]
    impl ContractReader for ScriptedChain {
        async fn call(&self, _: Address, function: &str, data: Vec<u8>) -> Result<Vec<u8>> {
            match function {
                "balanceOf" => Ok(enc::word_uint(u128::from(self.balance)).to_vec()),
                "ipId" => {
                    let token_id = data[4 + 32 + 32 + 31];
                    Ok(enc::word_address(addr(0x80 + token_id)).to_vec())
                }
                "getCoreMetadata" => {
                    let core = CoreMetadata {
                        nft_token_uri: "ipfs://QmToken".to_string(),
                        nft_metadata_hash: format!("0x{}", hex::encode([0u8; 32])),
                        metadata_uri: "ipfs://QmIp".to_string(),
                        metadata_hash: format!("0x{}", hex::encode([0u8; 32])),
                        registration_date: 1_700_000_000,
                        owner: addr(0x01),
                    };
                    Ok(testenc::core_metadata_return(&core))
                }
                "getAttachedLicenseTermsCount" => Ok(enc::word_uint(1).to_vec()),
                "getAttachedLicenseTerms" => {
                    let mut out = enc::word_address(addr(0x55)).to_vec();
                    out.extend_from_slice(&enc::word_uint(u128::from(
                        self.attached_terms_id,
                    )));
                    Ok(out)
                }
                "getLicenseTerms" => {
                    let terms = PilTerms {
                        transferable: true,
                        royalty_policy: Address::ZERO,
                        default_minting_fee: 0,
                        expiration: 0,
                        commercial_use: self.attached_terms_id != 1,
                        commercial_attribution: false,
                        commercializer_checker: Address::ZERO,
                        commercializer_checker_data: "0x".to_string(),
                        commercial_rev_share: 0,
                        commercial_rev_ceiling: 0,
                        derivatives_allowed: true,
                        derivatives_attribution: true,
                        derivatives_approval: false,
                        derivatives_reciprocal: true,
                        derivative_rev_ceiling: 0,
                        currency: Address::ZERO,
                        uri: String::new(),
                    };
                    Ok(testenc::pil_terms_return(&terms))
                }
                other => panic!("unexpected call {other}"),
            }
        }
    }

    struct CannedFetcher;

    #[async_trait]
    impl UriFetcher for CannedFetcher {
        async fn fetch_json(&self, uri: &str) -> Result<serde_json::Value> {
            Ok(match uri {
                "ipfs://QmToken" => json!({ "name": "Work", "image": "ipfs://QmImg" }),
                _ => json!({ "title": "Work", "description": "d", "attributes": [] }),
            })
        }
    }

    async fn service(chain: ScriptedChain, register_owner: Option<(Address, Address)>)
        -> GalleryService
    {
        let reader: Arc<dyn ContractReader> = Arc::new(chain);
        let store = Arc::new(MemoryStore::new());
        if let Some((owner, collection)) = register_owner {
            store.set(owner, collection).await.unwrap();
        }
        GalleryService::new(
            store,
            AssetEnumerator::new(
                Arc::clone(&reader),
                IpAssetRegistry::new(addr(0xAA), Arc::clone(&reader)),
                1516,
                4,
            ),
            Arc::new(MetadataResolver::new(
                CoreMetadataViewModule::new(addr(0xAB), Arc::clone(&reader)),
                Arc::new(CannedFetcher),
            )),
            Arc::new(LicenseAggregator::new(
                LicenseRegistry::new(addr(0xAC), Arc::clone(&reader)),
                PilLicenseTemplate::new(addr(0xAD), reader),
            )),
            4,
        )
    }

    #[tokio::test]
    async fn unregistered_owner_yields_no_collection() {
        let svc = service(ScriptedChain { balance: 2, attached_terms_id: 1 }, None).await;
        let outcome = svc.my_assets(addr(0x20)).await.unwrap();
        assert!(matches!(outcome, GalleryOutcome::NoCollection));
    }

    #[test_log::test(tokio::test)]
    async fn empty_collection_yields_no_assets_not_an_error() {
        let owner = addr(0x20);
        let collection = addr(0x10);
        let svc = service(
            ScriptedChain { balance: 0, attached_terms_id: 1 },
            Some((owner, collection)),
        )
        .await;
        let outcome = svc.my_assets(owner).await.unwrap();
        match outcome {
            GalleryOutcome::NoAssets { collection: c } => assert_eq!(c, collection),
            other => panic!("expected NoAssets, got {other:?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn assembles_items_in_token_index_order_with_licenses() {
        let owner = addr(0x20);
        let collection = addr(0x10);
        let svc = service(
            ScriptedChain { balance: 3, attached_terms_id: 1 },
            Some((owner, collection)),
        )
        .await;

        let outcome = svc.my_assets(owner).await.unwrap();
        let GalleryOutcome::Assets(view) = outcome else {
            panic!("expected assets");
        };
        assert_eq!(view.items.len(), 3);
        assert_eq!(
            view.items.iter().map(|i| i.asset.token_id).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
        for item in &view.items {
            assert_eq!(item.asset.token_contract, Some(collection));
            assert_eq!(item.licenses.len(), 1);
            assert_eq!(item.licenses[0].id, "1");
        }
    }

    #[tokio::test]
    async fn commercial_filter_drops_non_commercial_assets() {
        let owner = addr(0x20);
        let collection = addr(0x10);

        let non_commercial = service(
            ScriptedChain { balance: 1, attached_terms_id: 1 },
            Some((owner, collection)),
        )
        .await;
        let GalleryOutcome::Assets(view) = non_commercial.my_assets(owner).await.unwrap()
        else {
            panic!("expected assets");
        };
        assert!(commercial_only(view.items).is_empty());

        let commercial = service(
            ScriptedChain { balance: 1, attached_terms_id: 7 },
            Some((owner, collection)),
        )
        .await;
        let GalleryOutcome::Assets(view) = commercial.my_assets(owner).await.unwrap()
        else {
            panic!("expected assets");
        };
        assert_eq!(commercial_only(view.items).len(), 1);
    }
}
