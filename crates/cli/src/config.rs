use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use alloy::primitives::Address;
use gogobid_core::{
    BlockRange, SubgraphConfig,
    batch::DEFAULT_CALL_TIMEOUT,
    time::{DETAIL_CADENCE, LIST_CADENCE},
    tx::ChainSpec,
};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "gogobid.toml";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub subgraph: SubgraphSection,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub chain_name: String,
    /// AuctionPool address; also the escrow holding auctioned names.
    pub auction: Address,
    /// Domain NFT contract.
    pub token: Address,
    #[serde(default)]
    pub from_block: u64,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default = "default_native_name")]
    pub native_name: String,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubgraphSection {
    pub url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_caip_network")]
    pub caip_network: String,
    #[serde(default = "default_take")]
    pub take: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefreshConfig {
    pub call_timeout_secs: u64,
    pub list_interval_secs: u64,
    pub detail_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
            list_interval_secs: LIST_CADENCE.as_secs(),
            detail_interval_secs: DETAIL_CADENCE.as_secs(),
        }
    }
}

impl RefreshConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.max(1))
    }

    pub fn list_interval(&self) -> Duration {
        Duration::from_secs(self.list_interval_secs.max(1))
    }

    pub fn detail_interval(&self) -> Duration {
        Duration::from_secs(self.detail_interval_secs.max(1))
    }
}

fn default_confirmations() -> u64 {
    1
}

fn default_native_name() -> String {
    "Ether".to_string()
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn default_caip_network() -> String {
    "eip155:8453".to_string()
}

fn default_take() -> u32 {
    50
}

/// Command-line / environment values that win over the file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub subgraph_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse toml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl AppConfig {
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(rpc_url) = overrides.rpc_url {
            self.chain.rpc_url = rpc_url;
        }
        if let Some(url) = overrides.subgraph_url {
            self.subgraph.url = url;
        }
        if overrides.api_key.is_some() {
            self.subgraph.api_key = overrides.api_key;
        }
        self
    }

    pub fn chain_spec(&self) -> ChainSpec {
        ChainSpec {
            chain_id: self.chain.chain_id,
            chain_name: self.chain.chain_name.clone(),
            rpc_url: self.chain.rpc_url.clone(),
            native_name: self.chain.native_name.clone(),
            native_symbol: self.chain.native_symbol.clone(),
        }
    }

    pub fn subgraph_config(&self) -> SubgraphConfig {
        SubgraphConfig {
            url: self.subgraph.url.clone(),
            api_key: self.subgraph.api_key.clone(),
            caip_network: self.subgraph.caip_network.clone(),
            take: self.subgraph.take,
            escrow: self.chain.auction,
        }
    }

    pub fn block_range(&self) -> BlockRange {
        BlockRange::from_block(self.chain.from_block)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(config)
}
