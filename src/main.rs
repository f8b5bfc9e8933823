use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_ip_indexer::api::{self, AppState};
use story_ip_indexer::chain::{
    CoreMetadataViewModule, EthRpcClient, IpAssetRegistry, LicenseRegistry,
    PilLicenseTemplate,
};
use story_ip_indexer::config::Config;
use story_ip_indexer::ipfs::PinataClient;
use story_ip_indexer::pipeline::{
    AssetEnumerator, GalleryService, HttpFetcher, LicenseAggregator, MetadataResolver,
    ViewCache,
};
use story_ip_indexer::store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,story_ip_indexer=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init()?;
    info!("Initialized configuration");

    // Chain reader shared by every contract binding
    let reader = Arc::new(EthRpcClient::new(
        &config.chain.rpc_url,
        config.chain.rpc_timeout_ms,
    )?);
    info!("Connected RPC client to {}", config.chain.rpc_url);

    // Owner directory store
    let store = Arc::new(JsonFileStore::new(&config.directory.owners_file));

    // Pipeline services
    let enumerator = AssetEnumerator::new(
        reader.clone(),
        IpAssetRegistry::new(config.contracts.ip_asset_registry, reader.clone()),
        config.chain.chain_id,
        config.chain.max_concurrent_reads,
    );
    let resolver = Arc::new(MetadataResolver::new(
        CoreMetadataViewModule::new(
            config.contracts.core_metadata_view_module,
            reader.clone(),
        ),
        Arc::new(HttpFetcher::new(
            config.ipfs.gateway.clone(),
            config.chain.fetch_timeout_ms,
        )),
    ));
    let aggregator = Arc::new(LicenseAggregator::new(
        LicenseRegistry::new(config.contracts.license_registry, reader.clone()),
        PilLicenseTemplate::new(config.contracts.pil_license_template, reader.clone()),
    ));
    let gallery = Arc::new(GalleryService::new(
        store.clone(),
        enumerator,
        resolver.clone(),
        aggregator.clone(),
        config.chain.max_concurrent_reads,
    ));

    let pinata = config
        .ipfs
        .pinata_jwt
        .as_ref()
        .map(|jwt| Arc::new(PinataClient::new(config.ipfs.pinata_api_url.clone(), jwt.clone())));
    if pinata.is_none() {
        info!("PINATA_JWT not set, upload endpoint disabled");
    }

    let state = AppState {
        store,
        gallery,
        resolver,
        aggregator,
        pinata,
        gallery_cache: Arc::new(ViewCache::new()),
        write_api_key: config.directory.write_api_key.clone(),
    };

    // Start API server; runs until a shutdown signal arrives
    api::start_api_server(state).await?;

    info!("Story IP indexer shutdown complete");
    Ok(())
}
