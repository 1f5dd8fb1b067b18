use crate::errors::{AppError, AppResult};
use crate::script::exodus_destination;
use crate::types::ProtocolParams;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub processing: ProcessingConfig,
    pub bitcoin_rpc: BitcoinRpcConfig,
}

/// Network preset plus per-field overrides
///
/// Unset overrides keep the preset's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub preset: String,
    /// Class C marker as hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_packets: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_push_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dust_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exodus_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkey_hash_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_hash_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_script_hash_versions: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_data_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_hash_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multisig_height: Option<u32>,
}

impl NetworkConfig {
    pub fn preset(name: &str) -> Self {
        Self {
            preset: name.to_string(),
            ..Self::default()
        }
    }

    /// Resolve the preset and overrides into validated protocol parameters
    pub fn protocol_params(&self) -> Result<ProtocolParams, ConfigError> {
        let mut params = ProtocolParams::from_preset(&self.preset).ok_or_else(|| {
            ConfigError::Message(format!(
                "Unknown network preset '{}' (expected bitcoin, testnet or regtest)",
                self.preset
            ))
        })?;

        if let Some(marker) = &self.marker {
            let bytes = hex::decode(marker)
                .map_err(|e| ConfigError::Message(format!("Invalid marker hex: {}", e)))?;
            params.marker = bytes.as_slice().try_into().map_err(|_| {
                ConfigError::Message(format!("Marker must be 4 bytes, got {}", bytes.len()))
            })?;
        }
        if let Some(packet_size) = self.packet_size {
            params.packet_size = packet_size;
        }
        if let Some(max_packets) = self.max_packets {
            params.max_packets = max_packets;
        }
        if let Some(max_push_size) = self.max_push_size {
            params.max_push_size = max_push_size;
        }
        if let Some(dust_value) = self.dust_value {
            params.dust_value = dust_value;
        }
        if let Some(exodus_address) = &self.exodus_address {
            params.exodus_address = exodus_address.clone();
        }
        if let Some(version) = self.pubkey_hash_version {
            params.address_versions.pubkey_hash = version;
        }
        if let Some(version) = self.script_hash_version {
            params.address_versions.script_hash = version;
        }
        if let Some(versions) = &self.legacy_script_hash_versions {
            params.address_versions.legacy_script_hash = versions.clone();
        }
        if let Some(height) = self.null_data_height {
            params.activation.null_data_height = height;
        }
        if let Some(height) = self.script_hash_height {
            params.activation.script_hash_height = height;
        }
        if let Some(height) = self.multisig_height {
            params.activation.multisig_height = height;
        }

        validate_params(&params)?;
        Ok(params)
    }
}

/// Reject parameter sets the codec cannot work with
fn validate_params(params: &ProtocolParams) -> Result<(), ConfigError> {
    // A fake key is 33 bytes: prefix, packet and at least one adjustable byte
    if !(2..=31).contains(&params.packet_size) {
        return Err(ConfigError::Message(format!(
            "packet_size must be between 2 and 31, got {}",
            params.packet_size
        )));
    }
    if params.max_packets == 0 {
        return Err(ConfigError::Message("max_packets must be positive".to_string()));
    }
    if params.max_push_size <= params.marker.len() {
        return Err(ConfigError::Message(format!(
            "max_push_size {} leaves no room for data behind the {}-byte marker",
            params.max_push_size,
            params.marker.len()
        )));
    }
    if exodus_destination(params).is_none() {
        return Err(ConfigError::Message(format!(
            "Exodus address {} is not valid for the configured address versions",
            params.exodus_address
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Worker threads for batch parsing
    pub threads: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Bitcoin RPC configuration for fetching transactions and their previous outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinRpcConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
    pub concurrent_requests: usize,
}

impl Default for BitcoinRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8332".to_string(),
            username: "bitcoin".to_string(),
            password: "password".to_string(),
            timeout_seconds: 60,
            max_retries: 10,
            initial_backoff_ms: 100,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 30,
            concurrent_requests: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml in the working directory and environment
    /// variables. Environment variables take precedence over file configuration.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration with an explicit file instead of `config.toml`
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let rpc = BitcoinRpcConfig::default();
        let processing = ProcessingConfig::default();
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        let config = Config::builder()
            // Start with default values
            .set_default("network.preset", "bitcoin")?
            .set_default("processing.threads", processing.threads as i64)?
            // Bitcoin RPC defaults
            .set_default("bitcoin_rpc.url", rpc.url)?
            .set_default("bitcoin_rpc.username", rpc.username)?
            .set_default("bitcoin_rpc.password", rpc.password)?
            .set_default("bitcoin_rpc.timeout_seconds", rpc.timeout_seconds)?
            .set_default("bitcoin_rpc.max_retries", rpc.max_retries as i64)?
            .set_default("bitcoin_rpc.initial_backoff_ms", rpc.initial_backoff_ms)?
            .set_default("bitcoin_rpc.backoff_multiplier", rpc.backoff_multiplier)?
            .set_default("bitcoin_rpc.max_backoff_seconds", rpc.max_backoff_seconds)?
            .set_default(
                "bitcoin_rpc.concurrent_requests",
                rpc.concurrent_requests as i64,
            )?
            .add_source(file)
            // OMNI_NETWORK__PRESET, OMNI_NETWORK__NULL_DATA_HEIGHT, OMNI_PROCESSING__THREADS, ...
            .add_source(
                Environment::with_prefix("OMNI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // BITCOIN_RPC_* env variables override RPC settings
        if let Ok(url) = env::var("BITCOIN_RPC_URL") {
            app_config.bitcoin_rpc.url = url;
        }
        if let Ok(username) = env::var("BITCOIN_RPC_USERNAME") {
            app_config.bitcoin_rpc.username = username;
        }
        if let Ok(password) = env::var("BITCOIN_RPC_PASSWORD") {
            app_config.bitcoin_rpc.password = password;
        }

        // Surface bad network settings at load time rather than on first parse
        app_config.network.protocol_params()?;

        Ok(app_config)
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Result<Self, ConfigError> {
        // Try to load config for defaults, but don't fail if not found
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self {
                network: NetworkConfig::preset("bitcoin"),
                processing: ProcessingConfig::default(),
                bitcoin_rpc: BitcoinRpcConfig::default(),
            }),
        }
    }

    pub fn protocol_params(&self) -> Result<ProtocolParams, ConfigError> {
        self.network.protocol_params()
    }

    /// Render as a config.toml document
    pub fn to_toml_string(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to render config: {}", e)))
    }
}
