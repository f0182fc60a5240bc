//! Configuration loading for the harness.
//!
//! Configuration is loaded from a TOML file. Every field has a default, so an
//! empty file (or no file at all) targets a local network.
//!
//! Lookup order: explicit path, then `$SYSTEST_CONFIG`, then
//! `systest.toml` in the platform config directory, then defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use systest_core::PollPolicy;

use crate::transport::ServiceUrls;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SYSTEST_CONFIG";

/// File name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "systest.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Service endpoints.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Convergence polling.
    #[serde(default)]
    pub poll: PollConfig,
    /// External CLI binaries.
    #[serde(default)]
    pub cli: CliConfig,
    /// Wallet names used by scenarios.
    #[serde(default)]
    pub wallets: WalletsConfig,
}

/// Service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Sharder base URL (default: http://localhost:7171).
    #[serde(default = "default_sharder_url")]
    pub sharder_url: String,
    /// Miner base URL (default: http://localhost:7071).
    #[serde(default = "default_miner_url")]
    pub miner_url: String,
    /// Aggregate API base URL (default: http://localhost:9081).
    #[serde(default = "default_zbox_url")]
    pub zbox_url: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Convergence polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Budget in seconds (default: 120).
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between checks in milliseconds (default: 1000).
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

/// External CLI binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Path to the wallet CLI (default: ./zwallet).
    #[serde(default = "default_zwallet_path")]
    pub zwallet_path: PathBuf,
    /// Path to the storage CLI (default: ./zbox).
    #[serde(default = "default_zbox_path")]
    pub zbox_path: PathBuf,
    /// Directory holding wallets and the network config (default: ./config).
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    /// Network config file name inside `config_dir` (default: config.yaml).
    #[serde(default = "default_network_config")]
    pub network_config: String,
    /// Attempts per command before giving up (default: 3).
    #[serde(default = "default_cli_attempts")]
    pub attempts: u32,
    /// Delay between attempts in milliseconds (default: 2000).
    #[serde(default = "default_cli_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Wallet names (files are `<name>_wallet.json` inside `cli.config_dir`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletsConfig {
    /// Wallet funding the scenarios.
    #[serde(default = "default_sdk_wallet")]
    pub sdk: String,
    /// Owner of the storage smart contract.
    #[serde(default = "default_owner_wallet")]
    pub owner: String,
    /// Delegate wallet of the blobbers.
    #[serde(default = "default_blobber_owner_wallet")]
    pub blobber_owner: String,
}

// Default value functions
fn default_sharder_url() -> String {
    "http://localhost:7171".to_string()
}

fn default_miner_url() -> String {
    "http://localhost:7071".to_string()
}

fn default_zbox_url() -> String {
    "http://localhost:9081".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_timeout_secs() -> u64 {
    120 // 2 minutes
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_zwallet_path() -> PathBuf {
    PathBuf::from("./zwallet")
}

fn default_zbox_path() -> PathBuf {
    PathBuf::from("./zbox")
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("./config")
}

fn default_network_config() -> String {
    "config.yaml".to_string()
}

fn default_cli_attempts() -> u32 {
    3
}

fn default_cli_retry_delay_ms() -> u64 {
    2000
}

fn default_sdk_wallet() -> String {
    "sdk".to_string()
}

fn default_owner_wallet() -> String {
    "owner".to_string()
}

fn default_blobber_owner_wallet() -> String {
    "blobber_owner".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            sharder_url: default_sharder_url(),
            miner_url: default_miner_url(),
            zbox_url: default_zbox_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_poll_timeout_secs(),
            interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            zwallet_path: default_zwallet_path(),
            zbox_path: default_zbox_path(),
            config_dir: default_config_dir(),
            network_config: default_network_config(),
            attempts: default_cli_attempts(),
            retry_delay_ms: default_cli_retry_delay_ms(),
        }
    }
}

impl Default for WalletsConfig {
    fn default() -> Self {
        Self {
            sdk: default_sdk_wallet(),
            owner: default_owner_wallet(),
            blobber_owner: default_blobber_owner_wallet(),
        }
    }
}

impl NetworkConfig {
    /// Base URLs for the HTTP transport.
    pub fn service_urls(&self) -> ServiceUrls {
        ServiceUrls {
            sharder: self.sharder_url.clone(),
            miner: self.miner_url.clone(),
            zbox: self.zbox_url.clone(),
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PollConfig {
    /// Polling policy.
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::new(Duration::from_secs(self.timeout_secs))
            .with_interval(Duration::from_millis(self.interval_ms))
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load configuration following the lookup order.
    ///
    /// An explicit path or `$SYSTEST_CONFIG` must exist; the platform
    /// default is only used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    fn load_with(explicit: Option<&Path>, env: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env {
            return Self::from_file(&path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }

    /// Write to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Config file path in the platform config directory.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "storenet", "systest")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// Failed to write configuration file.
    #[error("failed to write config file {path}: {source}")]
    WriteError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to serialize configuration.
    #[error("failed to serialize config: {0}")]
    SerializeError(toml::ser::Error),
}
