use anyhow::{anyhow, Result};
use config::{Config, ConfigError, Environment, File};
use serde_derive::{Deserialize, Serialize};
use shellexpand::tilde;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_NETWORK: &str = "rinkeby";
pub const RINKEBY_CHAIN_ID: &str = "0x4";
pub const DOORS_CONTRACT_ADDRESS: &str = "0x2C2895bDa1C05c5A53b51349204a9CF20C58e622";
pub const TOKEN_URL_TEMPLATE: &str = "https://rinkeby.rarible.com/token/{contract}:{token_id}";
pub const TX_URL_TEMPLATE: &str = "https://rinkeby.etherscan.io/tx/{tx}";
pub const COLLECTION_URL: &str =
    "https://rinkeby.rarible.com/collection/0x2c2895bda1c05c5a53b51349204a9cf20c58e622";
pub const TOTAL_MINT_COUNT: u64 = 50;

pub fn init_config(
    is_force: bool,
    config_path: String,
    default_network: String,
    provider_url: Option<String>,
    chain_id: String,
) -> Result<()> {
    let config_path = tilde(config_path.as_str()).into_owned();
    if std::path::Path::new(&config_path).exists() && !is_force {
        println!(
            "void-mint config already exists at {}, so this command do nothing. if you want to overwrite it, use `-f`",
            &config_path
        );
        return Ok(());
    }
    let mut networks_config = BTreeMap::new();
    networks_config.insert(
        default_network.clone(),
        NetworkConfig {
            network_name: default_network.clone(),
            provider_url,
            chain_id,
        },
    );
    let mint_config = MintConfig {
        default_network,
        networks_config,
        ..Default::default()
    };
    mint_config.write(config_path.as_str())
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct MintConfig {
    pub default_network: String,
    pub contract_address: String,
    pub token_url_template: String,
    pub tx_url_template: String,
    pub collection_url: String,
    pub total_mint_count: u64,
    pub confirmation_poll_interval_ms: u64,
    pub event_poll_interval_ms: u64,
    pub confirmation_timeout_secs: Option<u64>,
    pub networks_config: BTreeMap<String, NetworkConfig>,
}

#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network_name: String,
    /// Wallet JSON-RPC endpoint. Absent means no wallet is available.
    pub provider_url: Option<String>,
    pub chain_id: String,
}

impl Default for MintConfig {
    fn default() -> Self {
        let mut networks_config = BTreeMap::new();
        networks_config.insert(
            DEFAULT_NETWORK.to_owned(),
            NetworkConfig {
                network_name: "Rinkeby".to_owned(),
                provider_url: None,
                chain_id: RINKEBY_CHAIN_ID.to_owned(),
            },
        );
        MintConfig {
            default_network: DEFAULT_NETWORK.to_owned(),
            contract_address: DOORS_CONTRACT_ADDRESS.to_owned(),
            token_url_template: TOKEN_URL_TEMPLATE.to_owned(),
            tx_url_template: TX_URL_TEMPLATE.to_owned(),
            collection_url: COLLECTION_URL.to_owned(),
            total_mint_count: TOTAL_MINT_COUNT,
            confirmation_poll_interval_ms: 1000,
            event_poll_interval_ms: 1000,
            confirmation_timeout_secs: None,
            networks_config,
        }
    }
}

impl MintConfig {
    pub fn new(config_path: &str) -> Result<Self, ConfigError> {
        let config_path = tilde(config_path).into_owned();
        Config::builder()
            .add_source(File::with_name(config_path.as_str()))
            .add_source(Environment::with_prefix("app"))
            .build()?
            .try_deserialize()
    }

    pub fn get_network_config(&self, network: &Option<String>) -> Result<NetworkConfig> {
        let network = if let Some(network) = network {
            network
        } else {
            &self.default_network
        };
        self.networks_config.get(network).cloned().ok_or_else(|| {
            anyhow!(
                "invalid config file: networks_config.{} not existed",
                network
            )
        })
    }

    pub fn get_provider_url(&self, network: &Option<String>) -> Result<Option<String>> {
        Ok(self.get_network_config(network)?.provider_url)
    }

    pub fn get_chain_id(&self, network: &Option<String>) -> Result<String> {
        Ok(self.get_network_config(network)?.chain_id)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_millis(self.event_poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }

    pub fn write(&self, config_path: &str) -> Result<()> {
        let s = toml::to_string_pretty(self).map_err(|e| anyhow!("toml serde error: {}", e))?;
        let parent_path = std::path::Path::new(config_path)
            .parent()
            .ok_or_else(|| anyhow!("invalid config file path: {}", config_path))?;
        std::fs::create_dir_all(parent_path)
            .map_err(|e| anyhow!("fail to create config path. err: {}", e))?;
        std::fs::write(config_path, &s)
            .map_err(|e| anyhow!("fail to write mint config. err: {}", e))
    }
}
