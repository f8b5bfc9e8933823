// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;

use crate::address::Address;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub chain: ChainConfig,
    pub contracts: ContractsConfig,
    pub directory: DirectoryConfig,
    pub ipfs: IpfsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub rpc_timeout_ms: u64,
    pub fetch_timeout_ms: u64,
    /// Upper bound on concurrent per-index contract reads in the
    /// enumerator and gallery fan-outs.
    pub max_concurrent_reads: usize,
}

/// Deployed contract addresses for one Story network. Defaults target the
/// Odyssey testnet deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub ip_asset_registry: Address,
    pub license_registry: Address,
    pub pil_license_template: Address,
    pub core_metadata_view_module: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Path of the JSON file mapping owner addresses to collection
    /// contract addresses.
    pub owners_file: String,
    /// Shared secret required on directory writes when set.
    pub write_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpfsConfig {
    /// Bearer credential for the Pinata pinning API. Uploads are rejected
    /// when unset.
    pub pinata_jwt: Option<String>,
    pub pinata_api_url: String,
    /// Public gateway used to dereference ipfs:// URIs.
    pub gateway: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv::dotenv();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env_parse("SERVER_PORT", 8080)?,
                enable_cors: env_parse("ENABLE_CORS", true)?,
            },
            chain: ChainConfig {
                rpc_url: env::var("RPC_URL")
                    .unwrap_or_else(|_| "https://odyssey.storyrpc.io".to_string()),
                chain_id: env_parse("CHAIN_ID", 1516)?,
                rpc_timeout_ms: env_parse("RPC_TIMEOUT_MS", 10_000)?,
                fetch_timeout_ms: env_parse("FETCH_TIMEOUT_MS", 15_000)?,
                max_concurrent_reads: env_parse("MAX_CONCURRENT_READS", 8)?,
            },
            contracts: ContractsConfig {
                ip_asset_registry: env_address(
                    "IP_ASSET_REGISTRY",
                    "0x77319B4031e6eF1250907aa00018B8B1c67a244b",
                )?,
                license_registry: env_address(
                    "LICENSE_REGISTRY",
                    "0x529a750E02d8E2f15649c13D69a465286a780e24",
                )?,
                pil_license_template: env_address(
                    "PIL_LICENSE_TEMPLATE",
                    "0x58E2c909D557Cd23EF90D14f8fd21667A5Ae7a93",
                )?,
                core_metadata_view_module: env_address(
                    "CORE_METADATA_VIEW_MODULE",
                    "0x6839De4A647eE2311bd765f615E09f7bd930ed25",
                )?,
            },
            directory: DirectoryConfig {
                owners_file: env::var("OWNERS_FILE")
                    .unwrap_or_else(|_| "spg_nft_owners.json".to_string()),
                write_api_key: env::var("OWNER_DIRECTORY_API_KEY").ok(),
            },
            ipfs: IpfsConfig {
                pinata_jwt: env::var("PINATA_JWT").ok(),
                pinata_api_url: env::var("PINATA_API_URL")
                    .unwrap_or_else(|_| "https://api.pinata.cloud".to_string()),
                gateway: env::var("IPFS_GATEWAY")
                    .unwrap_or_else(|_| "https://ipfs.io".to_string()),
            },
        })
    }

    /// Parse the environment once and install the result as the process
    /// config.
    pub fn init() -> Result<&'static Config> {
        let config = Config::from_env()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    /// The installed process config. Panics if `init` has not run.
    pub fn get() -> &'static Config {
        CONFIG.get().expect("Config::init must be called before Config::get")
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} must parse as {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

fn env_address(key: &str, default: &str) -> Result<Address> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .with_context(|| format!("{key} must be a 20-byte hex address"))
}
