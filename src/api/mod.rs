// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::address::Address;
use crate::config::Config;
use crate::error::Error;
use crate::ipfs::PinataClient;
use crate::pipeline::{
    GalleryService, GalleryView, LicenseAggregator, MetadataResolver, ViewCache,
};
use crate::store::DirectoryStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DirectoryStore>,
    pub gallery: Arc<GalleryService>,
    pub resolver: Arc<MetadataResolver>,
    pub aggregator: Arc<LicenseAggregator>,
    pub pinata: Option<Arc<PinataClient>>,
    /// Latest successful gallery view per owner, guarded against stale
    /// overwrites.
    pub gallery_cache: Arc<ViewCache<Address, GalleryView>>,
    pub write_api_key: Option<String>,
}

/// Create the application router with all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // Owner directory routes
        .route(
            "/api/get_nft_contract_by_address",
            get(handlers::directory::get_nft_contract)
                .post(handlers::directory::set_nft_contract),
        )
        .route(
            "/api/get_existing_contracts",
            get(handlers::directory::get_existing_contracts),
        )
        // Pinning route
        .route("/api/upload_to_ipfs", post(handlers::pinning::upload_to_ipfs))
        // Asset and license read pipeline
        .route("/api/assets/:address", get(handlers::assets::get_my_assets))
        .route("/api/ipa/:ipaid", get(handlers::assets::get_asset_details))
        .route("/api/ipa/:ipaid/owner", get(handlers::assets::get_asset_owner))
        .route(
            "/api/ipa/:ipaid/licenses",
            get(handlers::licenses::get_asset_licenses),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    let app = router(state).layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.server.host, config.server.port)
        .parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, stopping API server");
        })
        .await?;

    Ok(())
}

/// Map a pipeline failure onto a distinct status code and body. Every kind
/// gets its own user-facing message; nothing is swallowed silently.
pub(crate) fn error_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    use serde_json::json;

    let (status, body) = match &err {
        Error::InvalidAddress(_) => {
            (StatusCode::BAD_REQUEST, json!({ "error": "Invalid address" }))
        }
        Error::Authorization => (
            StatusCode::UNAUTHORIZED,
            json!({ "error": "Missing or invalid API key" }),
        ),
        Error::Persistence(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Owner directory is unavailable" }),
        ),
        Error::NoAssetsFound { .. } => {
            // Normally handled as an empty state before reaching here.
            (StatusCode::NOT_FOUND, json!({ "error": "No assets found" }))
        }
        Error::Timeout { .. } => (
            StatusCode::GATEWAY_TIMEOUT,
            json!({ "error": "Upstream call timed out" }),
        ),
        Error::ContractCall { .. } => (
            StatusCode::BAD_GATEWAY,
            json!({ "error": "Failed to read from the chain" }),
        ),
        Error::MetadataFetch { .. } => (
            StatusCode::BAD_GATEWAY,
            json!({ "error": "Asset metadata is missing or unreachable" }),
        ),
        Error::LicenseFetch { .. } => (
            StatusCode::BAD_GATEWAY,
            json!({ "error": "Failed to load license terms" }),
        ),
        Error::Pinning(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "Error uploading to IPFS." }),
        ),
    };

    if status.is_server_error() {
        error!("request failed: {err}");
    } else {
        warn!("request rejected: {err}");
    }
    (status, Json(body))
}
