// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use axum::body::Body;
use axum::extract::{FromRequest, Multipart, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::api::{error_response, AppState};
use crate::error::Error;

/// Pin either a JSON document (`application/json` body) or a file
/// (`multipart/form-data` with a `file` field) to IPFS through the
/// configured pinning service.
pub async fn upload_to_ipfs(
    State(state): State<AppState>,
    request: Request<Body>,
) -> impl IntoResponse {
    let Some(pinata) = state.pinata.clone() else {
        return error_response(Error::Pinning(
            "pinning service is not configured".to_string(),
        ));
    };

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("application/json") {
        let bytes = match hyper::body::to_bytes(request.into_body()).await {
            Ok(bytes) => bytes,
            Err(e) => return error_response(Error::Pinning(e.to_string())),
        };
        let document: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "Invalid JSON" })),
                )
            }
        };
        return match pinata.pin_json(&document).await {
            Ok(hash) => {
                info!(%hash, "pinned JSON document");
                (StatusCode::OK, Json(json!({ "IpfsHash": hash })))
            }
            Err(e) => error_response(e),
        };
    }

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart,
            Err(e) => return error_response(Error::Pinning(e.to_string())),
        };

        loop {
            match multipart.next_field().await {
                Ok(Some(field)) if field.name() == Some("file") => {
                    let file_name = field
                        .file_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| "file".to_string());
                    let bytes = match field.bytes().await {
                        Ok(bytes) => bytes.to_vec(),
                        Err(e) => return error_response(Error::Pinning(e.to_string())),
                    };
                    return match pinata.pin_file(&file_name, bytes).await {
                        Ok(hash) => {
                            info!(%hash, %file_name, "pinned file");
                            (StatusCode::OK, Json(json!({ "IpfsHash": hash })))
                        }
                        Err(e) => error_response(e),
                    };
                }
                Ok(Some(_)) => continue,
                Ok(None) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "message": "No file uploaded" })),
                    )
                }
                Err(e) => return error_response(Error::Pinning(e.to_string())),
            }
        }
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Unsupported content type" })),
    )
}
