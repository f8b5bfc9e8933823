// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

pub mod assets;
pub mod directory;
pub mod health;
pub mod licenses;
pub mod metrics;
pub mod pinning;
