// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::address::Address;
use crate::api::{error_response, AppState};
use crate::pipeline::gallery::{commercial_only, GalleryOutcome, GalleryView};

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    /// Keep only assets carrying a commercial license.
    pub commercial: Option<bool>,
    /// Bypass the cached view and assemble a fresh one.
    pub refresh: Option<bool>,
}

/// Full my-assets view for a wallet: registered collection, enumerated
/// tokens, resolved metadata and license terms per asset. The three
/// non-failure states ("no collection", "no assets", assets) are distinct
/// in the response so the UI can branch without guessing.
pub async fn get_my_assets(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<GalleryQuery>,
) -> impl IntoResponse {
    let owner: Address = match address.parse() {
        Ok(owner) => owner,
        Err(e) => return error_response(e),
    };
    let commercial = query.commercial.unwrap_or(false);

    // Serve the last published view unless the caller asks for a fresh
    // assembly.
    if !query.refresh.unwrap_or(false) {
        if let Some(view) = state.gallery_cache.latest(&owner).await {
            return render_view(view, commercial, true);
        }
    }

    let token = state.gallery_cache.begin(&owner).await;
    match state.gallery.my_assets(owner).await {
        Ok(GalleryOutcome::Assets(view)) => {
            // A slow, superseded assembly is discarded here; the caller
            // that triggered it still gets its own result.
            state.gallery_cache.publish(&owner, token, view.clone()).await;
            render_view(view, commercial, false)
        }
        Ok(GalleryOutcome::NoCollection) => (
            StatusCode::OK,
            Json(json!({
                "owner": owner,
                "state": "no_collection",
                "assets": [],
            })),
        ),
        Ok(GalleryOutcome::NoAssets { collection }) => (
            StatusCode::OK,
            Json(json!({
                "owner": owner,
                "collection": collection,
                "state": "no_assets",
                "assets": [],
            })),
        ),
        Err(e) => error_response(e),
    }
}

fn render_view(
    view: GalleryView,
    commercial: bool,
    cached: bool,
) -> (StatusCode, Json<serde_json::Value>) {
    let items = if commercial { commercial_only(view.items) } else { view.items };
    (
        StatusCode::OK,
        Json(json!({
            "owner": view.owner,
            "collection": view.collection,
            "state": "ok",
            "cached": cached,
            "assets": items,
        })),
    )
}

/// On-chain owner of one IP asset, for caller-side ownership checks.
pub async fn get_asset_owner(
    State(state): State<AppState>,
    Path(ipaid): Path<String>,
) -> impl IntoResponse {
    let ip_id: Address = match ipaid.parse() {
        Ok(ip_id) => ip_id,
        Err(e) => return error_response(e),
    };

    match state.resolver.owner_of(ip_id).await {
        Ok(owner) => (
            StatusCode::OK,
            Json(json!({ "ipId": ip_id, "owner": owner })),
        ),
        Err(e) => error_response(e),
    }
}

/// Resolved metadata of one IP asset.
pub async fn get_asset_details(
    State(state): State<AppState>,
    Path(ipaid): Path<String>,
) -> impl IntoResponse {
    let ip_id: Address = match ipaid.parse() {
        Ok(ip_id) => ip_id,
        Err(e) => return error_response(e),
    };

    match state.resolver.resolve(ip_id).await {
        Ok(asset) => (
            StatusCode::OK,
            Json(serde_json::to_value(asset).unwrap_or_default()),
        ),
        Err(e) => error_response(e),
    }
}
