// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use axum::response::IntoResponse;

use crate::metrics;

/// Prometheus metrics in the text exposition format.
pub async fn get_metrics() -> impl IntoResponse {
    metrics::gather()
}
