// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::address::Address;
use crate::api::{error_response, AppState};
use crate::error::Error;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
}

/// Look up the NFT collection registered for a wallet. The body carries
/// `nftContract` only when a collection exists; an unknown owner is a
/// well-defined absence that starts the onboarding flow.
pub async fn get_nft_contract(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> impl IntoResponse {
    let Some(raw) = query.address else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Address is required" })),
        );
    };

    let owner: Address = match raw.parse() {
        Ok(owner) => owner,
        Err(e) => return error_response(e),
    };

    match state.store.get(owner).await {
        Ok(Some(contract)) => {
            (StatusCode::OK, Json(json!({ "nftContract": contract })))
        }
        Ok(None) => (StatusCode::OK, Json(json!({}))),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetContractBody {
    pub address: Option<String>,
    pub nft_contract: Option<String>,
}

/// Register (or overwrite) the collection for a wallet. When a write key
/// is configured, the `x-api-key` header must match it.
pub async fn set_nft_contract(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SetContractBody>,
) -> impl IntoResponse {
    if let Some(expected) = &state.write_api_key {
        let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return error_response(Error::Authorization);
        }
    }

    let (Some(raw_address), Some(raw_contract)) = (body.address, body.nft_contract)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Address and nftContract are required" })),
        );
    };

    let owner: Address = match raw_address.parse() {
        Ok(owner) => owner,
        Err(e) => return error_response(e),
    };
    let contract: Address = match raw_contract.parse() {
        Ok(contract) => contract,
        Err(e) => return error_response(e),
    };

    match state.store.set(owner, contract).await {
        Ok(()) => {
            info!(%owner, %contract, "collection registered");
            (StatusCode::OK, Json(json!({ "success": true })))
        }
        Err(e) => error_response(e),
    }
}

/// Dump the whole owner directory.
pub async fn get_existing_contracts(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.all().await {
        Ok(owners) => (StatusCode::OK, Json(serde_json::to_value(owners).unwrap_or_default())),
        Err(e) => error_response(e),
    }
}
