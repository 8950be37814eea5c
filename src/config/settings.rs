//! Configuration settings for Perception.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment prefix for layered overrides, e.g. `PERCEPTION_LEDGER__NODE_URL`.
const ENV_PREFIX: &str = "PERCEPTION";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger node and target program.
    pub ledger: LedgerConfig,
    /// Wallet bridge configuration.
    pub wallet: WalletConfig,
    /// Default trade form values.
    pub trade: TradeDefaults,
}

impl Config {
    /// Load configuration from the default file location and environment.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration.
    ///
    /// Sources, lowest precedence first: built-in defaults, the TOML file
    /// (optional), `PERCEPTION_*` variables, then the legacy
    /// `APTOS_NODE_URL` / `MOVE_MODULE_ADDRESS` variables.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = path.unwrap_or_else(super::default_config_path);
        let legacy_node_url = std::env::var("APTOS_NODE_URL").ok();
        let legacy_module_address = std::env::var("MOVE_MODULE_ADDRESS").ok();

        Self::build(&config_path, legacy_node_url, legacy_module_address)
    }

    fn build(
        config_path: &Path,
        legacy_node_url: Option<String>,
        legacy_module_address: Option<String>,
    ) -> crate::Result<Self> {
        let to_config_err = |e: config::ConfigError| crate::Error::config(e.to_string());

        config::Config::builder()
            .add_source(
                config::File::from(config_path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("ledger.node_url", legacy_node_url)
            .map_err(to_config_err)?
            .set_override_option("ledger.module_address", legacy_module_address)
            .map_err(to_config_err)?
            .build()
            .map_err(to_config_err)?
            .try_deserialize()
            .map_err(to_config_err)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<PathBuf> {
        let config_path = path.unwrap_or_else(super::default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    /// Check that the ledger target is fully configured.
    pub fn validate(&self) -> crate::Result<()> {
        self.ledger.ensure_configured()?;
        reqwest::Url::parse(&self.ledger.node_url).map_err(|e| {
            crate::Error::config(format!("Invalid node URL '{}': {}", self.ledger.node_url, e))
        })?;
        Ok(())
    }
}

/// Ledger node and target program configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fullnode REST base URL.
    pub node_url: String,
    /// Address the market program is published under.
    pub module_address: String,
    /// Module name inside the program.
    pub module_name: String,
    /// Confirmation deadline in milliseconds.
    pub confirm_timeout_ms: u64,
    /// Delay between confirmation polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl LedgerConfig {
    /// Fail unless both the node URL and module address are present.
    pub fn ensure_configured(&self) -> crate::Result<()> {
        if self.node_url.trim().is_empty() {
            return Err(crate::Error::config(
                "Ledger node URL not configured. Set APTOS_NODE_URL.",
            ));
        }
        if self.module_address.trim().is_empty() {
            return Err(crate::Error::config(
                "Move module address not configured. Set MOVE_MODULE_ADDRESS.",
            ));
        }
        Ok(())
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_url: "https://fullnode.devnet.aptoslabs.com/v1".to_string(),
            module_address: String::new(),
            module_name: "marketplace".to_string(),
            confirm_timeout_ms: 60_000,
            poll_interval_ms: 1_000,
            request_timeout_secs: 10,
        }
    }
}

/// Wallet bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Base URL of the local wallet bridge.
    pub bridge_url: Option<String>,
    /// Connected account address.
    pub account: Option<String>,
    /// Signing timeout in seconds. Generous because a human may be prompted.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            bridge_url: None,
            account: None,
            request_timeout_secs: 300,
        }
    }
}

/// Default values for the trade form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeDefaults {
    /// Agreement percentage submitted with a trade.
    pub agreement_percentage: u8,
    /// Slippage tolerance in percent.
    pub slippage_percent: Decimal,
}

impl Default for TradeDefaults {
    fn default() -> Self {
        Self {
            agreement_percentage: 50,
            slippage_percent: Decimal::ONE,
        }
    }
}
