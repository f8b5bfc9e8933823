// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

pub mod asset;
pub mod license;

pub use asset::{Attribute, IpAsset, IpMetadata, NftTokenMetadata};
pub use license::{License, LicenseLabel, TermAttribute, NON_COMMERCIAL_TERMS_ID};
