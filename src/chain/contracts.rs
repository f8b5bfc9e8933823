// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

//! Typed bindings over the deployed contracts the pipeline reads. One
//! struct per contract; every method builds call data, issues the read
//! through the `ContractReader` seam, and decodes the result into a
//! concrete type, failing with `ContractCall` on any shape mismatch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::chain::abi::{AbiError, CallBuilder, Decoder};
use crate::chain::rpc::ContractReader;
use crate::error::{Error, Result};

fn decode_failure(contract: Address, function: &str, e: AbiError) -> Error {
    Error::contract_call(contract.checksummed(), function, format!("decode: {e}"))
}

/// ERC-721 surface of an SPG NFT collection contract.
#[derive(Clone)]
pub struct SpgNftContract {
    pub address: Address,
    reader: Arc<dyn ContractReader>,
}

impl SpgNftContract {
    pub fn new(address: Address, reader: Arc<dyn ContractReader>) -> Self {
        Self { address, reader }
    }

    /// Number of tokens `owner` holds in this collection.
    pub async fn balance_of(&self, owner: Address) -> Result<u64> {
        const FN: &str = "balanceOf";
        let data = CallBuilder::new("balanceOf(address)").address(owner).build();
        let raw = self.reader.call(self.address, FN, data).await?;
        Decoder::new(&raw)
            .uint_u64()
            .map_err(|e| decode_failure(self.address, FN, e))
    }
}

/// Registry that derives the IP account address for `(chain, token
/// contract, token id)`. The pipeline always resolves IP ids through this
/// call, never by computing the derivation itself.
#[derive(Clone)]
pub struct IpAssetRegistry {
    pub address: Address,
    reader: Arc<dyn ContractReader>,
}

impl IpAssetRegistry {
    pub fn new(address: Address, reader: Arc<dyn ContractReader>) -> Self {
        Self { address, reader }
    }

    pub async fn ip_id(
        &self,
        chain_id: u64,
        token_contract: Address,
        token_id: u64,
    ) -> Result<Address> {
        const FN: &str = "ipId";
        let data = CallBuilder::new("ipId(uint256,address,uint256)")
            .uint(u128::from(chain_id))
            .address(token_contract)
            .uint(u128::from(token_id))
            .build();
        let raw = self.reader.call(self.address, FN, data).await?;
        Decoder::new(&raw)
            .address()
            .map_err(|e| decode_failure(self.address, FN, e))
    }
}

/// On-chain core metadata of one IP asset, as returned by the
/// metadata-view module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreMetadata {
    pub nft_token_uri: String,
    pub nft_metadata_hash: String,
    pub metadata_uri: String,
    pub metadata_hash: String,
    /// Unix timestamp, passed through unformatted.
    pub registration_date: u64,
    pub owner: Address,
}

#[derive(Clone)]
pub struct CoreMetadataViewModule {
    pub address: Address,
    reader: Arc<dyn ContractReader>,
}

impl CoreMetadataViewModule {
    pub fn new(address: Address, reader: Arc<dyn ContractReader>) -> Self {
        Self { address, reader }
    }

    pub async fn get_core_metadata(&self, ip_id: Address) -> Result<CoreMetadata> {
        const FN: &str = "getCoreMetadata";
        let data = CallBuilder::new("getCoreMetadata(address)").address(ip_id).build();
        let raw = self.reader.call(self.address, FN, data).await?;
        decode_core_metadata(&raw).map_err(|e| decode_failure(self.address, FN, e))
    }

    pub async fn get_owner(&self, ip_id: Address) -> Result<Address> {
        const FN: &str = "getOwner";
        let data = CallBuilder::new("getOwner(address)").address(ip_id).build();
        let raw = self.reader.call(self.address, FN, data).await?;
        Decoder::new(&raw)
            .address()
            .map_err(|e| decode_failure(self.address, FN, e))
    }

}

// struct CoreMetadata { string nftTokenURI; bytes32 nftMetadataHash;
//   string metadataURI; bytes32 metadataHash;
//   uint256 registrationDate; address owner; }
fn decode_core_metadata(raw: &[u8]) -> Result<CoreMetadata, AbiError> {
    let mut outer = Decoder::new(raw);
    let mut tuple = outer.tuple()?;
    Ok(CoreMetadata {
        nft_token_uri: tuple.string()?,
        nft_metadata_hash: format!("0x{}", hex::encode(tuple.fixed_bytes32()?)),
        metadata_uri: tuple.string()?,
        metadata_hash: format!("0x{}", hex::encode(tuple.fixed_bytes32()?)),
        registration_date: tuple.uint_u64()?,
        owner: tuple.address()?,
    })
}

#[derive(Clone)]
pub struct LicenseRegistry {
    pub address: Address,
    reader: Arc<dyn ContractReader>,
}

impl LicenseRegistry {
    pub fn new(address: Address, reader: Arc<dyn ContractReader>) -> Self {
        Self { address, reader }
    }

    /// Number of license terms attached to the IP asset.
    pub async fn attached_terms_count(&self, ip_id: Address) -> Result<u64> {
        const FN: &str = "getAttachedLicenseTermsCount";
        let data = CallBuilder::new("getAttachedLicenseTermsCount(address)")
            .address(ip_id)
            .build();
        let raw = self.reader.call(self.address, FN, data).await?;
        Decoder::new(&raw)
            .uint_u64()
            .map_err(|e| decode_failure(self.address, FN, e))
    }

    /// The `(license template, terms id)` pair attached at `index`. The
    /// attachment index is positional; the terms id it maps to is what the
    /// template contract is then queried with.
    pub async fn attached_terms_at(
        &self,
        ip_id: Address,
        index: u64,
    ) -> Result<(Address, u64)> {
        const FN: &str = "getAttachedLicenseTerms";
        let data = CallBuilder::new("getAttachedLicenseTerms(address,uint256)")
            .address(ip_id)
            .uint(u128::from(index))
            .build();
        let raw = self.reader.call(self.address, FN, data).await?;
        let mut dec = Decoder::new(&raw);
        let template = dec.address().map_err(|e| decode_failure(self.address, FN, e))?;
        let terms_id = dec.uint_u64().map_err(|e| decode_failure(self.address, FN, e))?;
        Ok((template, terms_id))
    }
}

/// Full Programmable IP License term struct, field order matching the
/// template contract's `getLicenseTerms` return value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilTerms {
    pub transferable: bool,
    pub royalty_policy: Address,
    pub default_minting_fee: u128,
    pub expiration: u128,
    pub commercial_use: bool,
    pub commercial_attribution: bool,
    pub commercializer_checker: Address,
    pub commercializer_checker_data: String,
    /// Parts-per-million of a percent scale; 5_000_000 means 5%.
    pub commercial_rev_share: u32,
    pub commercial_rev_ceiling: u128,
    pub derivatives_allowed: bool,
    pub derivatives_attribution: bool,
    pub derivatives_approval: bool,
    pub derivatives_reciprocal: bool,
    pub derivative_rev_ceiling: u128,
    pub currency: Address,
    pub uri: String,
}

#[derive(Clone)]
pub struct PilLicenseTemplate {
    pub address: Address,
    reader: Arc<dyn ContractReader>,
}

impl PilLicenseTemplate {
    pub fn new(address: Address, reader: Arc<dyn ContractReader>) -> Self {
        Self { address, reader }
    }

    pub async fn get_license_terms(&self, terms_id: u64) -> Result<PilTerms> {
        const FN: &str = "getLicenseTerms";
        let data = CallBuilder::new("getLicenseTerms(uint256)")
            .uint(u128::from(terms_id))
            .build();
        let raw = self.reader.call(self.address, FN, data).await?;
        decode_pil_terms(&raw).map_err(|e| decode_failure(self.address, FN, e))
    }
}

fn decode_pil_terms(raw: &[u8]) -> Result<PilTerms, AbiError> {
    let mut outer = Decoder::new(raw);
    let mut t = outer.tuple()?;
    Ok(PilTerms {
        transferable: t.boolean()?,
        royalty_policy: t.address()?,
        default_minting_fee: t.uint_u128()?,
        expiration: t.uint_u128()?,
        commercial_use: t.boolean()?,
        commercial_attribution: t.boolean()?,
        commercializer_checker: t.address()?,
        commercializer_checker_data: format!("0x{}", hex::encode(t.bytes()?)),
        commercial_rev_share: t.uint_u32()?,
        commercial_rev_ceiling: t.uint_u128()?,
        derivatives_allowed: t.boolean()?,
        derivatives_attribution: t.boolean()?,
        derivatives_approval: t.boolean()?,
        derivatives_reciprocal: t.boolean()?,
        derivative_rev_ceiling: t.uint_u128()?,
        currency: t.address()?,
        uri: t.string()?,
    })
}

/// Test-only return-data builders, mirroring the contract encodings above.
#[cfg(test)]
pub(crate) mod testenc {
    use super::*;
    use crate::chain::abi::enc;

    pub fn core_metadata_return(meta: &CoreMetadata) -> Vec<u8> {
        let nft_hash = decode_hash(&meta.nft_metadata_hash);
        let ip_hash = decode_hash(&meta.metadata_hash);

        // Tuple head: 6 slots; dynamic tails follow.
        let head_len = 6 * 32;
        let nft_uri = enc::dynamic(meta.nft_token_uri.as_bytes());
        let meta_uri = enc::dynamic(meta.metadata_uri.as_bytes());

        let mut tuple = Vec::new();
        tuple.extend_from_slice(&enc::word_uint(head_len as u128));
        tuple.extend_from_slice(&nft_hash);
        tuple.extend_from_slice(&enc::word_uint((head_len + nft_uri.len()) as u128));
        tuple.extend_from_slice(&ip_hash);
        tuple.extend_from_slice(&enc::word_uint(u128::from(meta.registration_date)));
        tuple.extend_from_slice(&enc::word_address(meta.owner));
        tuple.extend_from_slice(&nft_uri);
        tuple.extend_from_slice(&meta_uri);

        let mut out = Vec::new();
        out.extend_from_slice(&enc::word_uint(0x20));
        out.extend_from_slice(&tuple);
        out
    }

    pub fn pil_terms_return(terms: &PilTerms) -> Vec<u8> {
        let head_len = 17 * 32;
        let checker_data = enc::dynamic(
            &hex::decode(terms.commercializer_checker_data.trim_start_matches("0x"))
                .expect("valid hex in test fixture"),
        );
        let uri = enc::dynamic(terms.uri.as_bytes());

        let mut tuple = Vec::new();
        tuple.extend_from_slice(&enc::word_bool(terms.transferable));
        tuple.extend_from_slice(&enc::word_address(terms.royalty_policy));
        tuple.extend_from_slice(&enc::word_uint(terms.default_minting_fee));
        tuple.extend_from_slice(&enc::word_uint(terms.expiration));
        tuple.extend_from_slice(&enc::word_bool(terms.commercial_use));
        tuple.extend_from_slice(&enc::word_bool(terms.commercial_attribution));
        tuple.extend_from_slice(&enc::word_address(terms.commercializer_checker));
        tuple.extend_from_slice(&enc::word_uint(head_len as u128));
        tuple.extend_from_slice(&enc::word_uint(u128::from(terms.commercial_rev_share)));
        tuple.extend_from_slice(&enc::word_uint(terms.commercial_rev_ceiling));
        tuple.extend_from_slice(&enc::word_bool(terms.derivatives_allowed));
        tuple.extend_from_slice(&enc::word_bool(terms.derivatives_attribution));
        tuple.extend_from_slice(&enc::word_bool(terms.derivatives_approval));
        tuple.extend_from_slice(&enc::word_bool(terms.derivatives_reciprocal));
        tuple.extend_from_slice(&enc::word_uint(terms.derivative_rev_ceiling));
        tuple.extend_from_slice(&enc::word_address(terms.currency));
        tuple.extend_from_slice(&enc::word_uint((head_len + checker_data.len()) as u128));
        tuple.extend_from_slice(&checker_data);
        tuple.extend_from_slice(&uri);

        let mut out = Vec::new();
        out.extend_from_slice(&enc::word_uint(0x20));
        out.extend_from_slice(&tuple);
        out
    }

    fn decode_hash(value: &str) -> [u8; 32] {
        let bytes = hex::decode(value.trim_start_matches("0x"))
            .expect("valid hex in test fixture");
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedReader {
        response: Vec<u8>,
    }

    #[async_trait]
    impl ContractReader for CannedReader {
        async fn call(&self, _: Address, _: &str, _: Vec<u8>) -> Result<Vec<u8>> {
            Ok(self.response.clone())
        }
    }

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[tokio::test]
    async fn core_metadata_round_trips() {
        let meta = CoreMetadata {
            nft_token_uri: "ipfs://QmTokenMeta".to_string(),
            nft_metadata_hash: format!("0x{}", hex::encode([0x11u8; 32])),
            metadata_uri: "https://gateway.pinata.cloud/ipfs/QmIpMeta".to_string(),
            metadata_hash: format!("0x{}", hex::encode([0x22u8; 32])),
            registration_date: 1_714_000_000,
            owner: addr(9),
        };
        let reader = Arc::new(CannedReader {
            response: testenc::core_metadata_return(&meta),
        });
        let view = CoreMetadataViewModule::new(addr(1), reader);

        let decoded = view.get_core_metadata(addr(2)).await.unwrap();
        assert_eq!(decoded.nft_token_uri, meta.nft_token_uri);
        assert_eq!(decoded.metadata_uri, meta.metadata_uri);
        assert_eq!(decoded.registration_date, meta.registration_date);
        assert_eq!(decoded.owner, meta.owner);
        assert_eq!(decoded.nft_metadata_hash, meta.nft_metadata_hash);
    }

    #[tokio::test]
    async fn pil_terms_round_trip() {
        let terms = PilTerms {
            transferable: true,
            royalty_policy: addr(3),
            default_minting_fee: 1_000_000_000_000_000_000,
            expiration: 0,
            commercial_use: true,
            commercial_attribution: true,
            commercializer_checker: Address::ZERO,
            commercializer_checker_data: "0x".to_string(),
            commercial_rev_share: 5_000_000,
            commercial_rev_ceiling: 0,
            derivatives_allowed: true,
            derivatives_attribution: true,
            derivatives_approval: false,
            derivatives_reciprocal: true,
            derivative_rev_ceiling: 0,
            currency: addr(4),
            uri: "".to_string(),
        };
        let reader = Arc::new(CannedReader {
            response: testenc::pil_terms_return(&terms),
        });
        let template = PilLicenseTemplate::new(addr(5), reader);

        let decoded = template.get_license_terms(2).await.unwrap();
        assert_eq!(decoded.commercial_rev_share, 5_000_000);
        assert_eq!(decoded.currency, addr(4));
        assert!(decoded.commercial_use);
        assert!(!decoded.derivatives_approval);
        assert_eq!(decoded.default_minting_fee, 1_000_000_000_000_000_000);
    }

    #[tokio::test]
    async fn malformed_return_data_is_a_contract_call_error() {
        let reader = Arc::new(CannedReader { response: vec![0u8; 8] });
        let collection = SpgNftContract::new(addr(6), reader);
        match collection.balance_of(addr(7)).await {
            Err(Error::ContractCall { function, .. }) => assert_eq!(function, "balanceOf"),
            other => panic!("expected ContractCall error, got {other:?}"),
        }
    }
}
