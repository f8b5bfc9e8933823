// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

pub mod abi;
pub mod contracts;
pub mod rpc;

pub use contracts::{
    CoreMetadata, CoreMetadataViewModule, IpAssetRegistry, LicenseRegistry,
    PilLicenseTemplate, PilTerms, SpgNftContract,
};
pub use rpc::{ContractReader, EthRpcClient};
