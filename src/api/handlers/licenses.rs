// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::address::Address;
use crate::api::{error_response, AppState};

/// License terms attached to one IP asset, in attachment-index order. The
/// non-commercial sentinel (terms id 1) arrives labeled distinctly but
/// with all fields read on-chain like any other id.
pub async fn get_asset_licenses(
    State(state): State<AppState>,
    Path(ipaid): Path<String>,
) -> impl IntoResponse {
    let ip_id: Address = match ipaid.parse() {
        Ok(ip_id) => ip_id,
        Err(e) => return error_response(e),
    };

    match state.aggregator.list_license_terms(ip_id).await {
        Ok(licenses) => (
            StatusCode::OK,
            Json(json!({
                "ipId": ip_id,
                "licenses": licenses,
            })),
        ),
        Err(e) => error_response(e),
    }
}
