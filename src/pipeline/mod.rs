// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

pub mod enumerator;
pub mod gallery;
pub mod guard;
pub mod license;
pub mod metadata;

pub use enumerator::{AssetEnumerator, EnumeratedAsset};
pub use gallery::{GalleryItem, GalleryOutcome, GalleryService, GalleryView};
pub use guard::{Token, ViewCache};
pub use license::LicenseAggregator;
pub use metadata::{HttpFetcher, MetadataResolver, UriFetcher};
