//! CLI command implementations and the arguments they share

pub mod decode;
pub mod decode_raw;
pub mod encode;
pub mod inspect;
pub mod show_config;
pub mod test_rpc;

use crate::config::{AppConfig, BitcoinRpcConfig};
use crate::errors::{AppError, AppResult, ParseResult};
use crate::types::{ParseOutcome, ProtocolParams};
use clap::{Args, ValueEnum};
use serde_json::json;
use std::path::PathBuf;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration file and network selection
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (defaults to config.toml in the working directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Network preset: bitcoin, testnet or regtest (overrides config.toml)
    #[arg(long)]
    pub network: Option<String>,
}

impl ConfigArgs {
    pub fn load(&self) -> AppResult<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from(Some(path.as_path()))
                .map_err(|e| AppError::Config(format!("Failed to load {}: {}", path.display(), e)))?,
            None => AppConfig::get_defaults()?,
        };
        if let Some(network) = &self.network {
            config.network.preset = network.clone();
        }
        Ok(config)
    }

    /// Resolved protocol parameters together with the rest of the configuration
    pub fn protocol_params(&self) -> AppResult<(AppConfig, ProtocolParams)> {
        let config = self.load()?;
        let params = config.protocol_params()?;
        Ok((config, params))
    }
}

/// Bitcoin RPC connection overrides
#[derive(Args, Debug, Clone, Default)]
pub struct RpcArgs {
    /// Bitcoin RPC URL (overrides config.toml)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Bitcoin RPC username (overrides config.toml)
    #[arg(long)]
    pub rpc_username: Option<String>,

    /// Bitcoin RPC password (overrides config.toml)
    #[arg(long)]
    pub rpc_password: Option<String>,
}

impl RpcArgs {
    pub fn apply(&self, mut rpc_config: BitcoinRpcConfig) -> BitcoinRpcConfig {
        if let Some(url) = &self.rpc_url {
            rpc_config.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            rpc_config.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            rpc_config.password = password.clone();
        }
        rpc_config
    }
}

/// Render one parse result
pub fn render_result(
    txid: &str,
    result: &ParseResult<ParseOutcome>,
    format: OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => {
            let value = match result {
                Ok(outcome) => serde_json::to_value(outcome)?,
                Err(e) => json!({ "status": "error", "txid": txid, "error": e.to_string() }),
            };
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Text => Ok(match result {
            Ok(ParseOutcome::Message(message)) => {
                let mut lines = vec![
                    format!("Transaction: {}", message.txid),
                    format!("Class:       {}", message.encoding_class),
                    format!("Sender:      {}", message.sender),
                    format!(
                        "Receiver:    {}",
                        message.receiver.as_deref().unwrap_or("-")
                    ),
                    format!("Fee:         {} sats", message.fee),
                    format!("Block:       {} ({})", message.block_height, message.block_time),
                    format!("Payload:     {}", message.payload_hex()),
                ];
                if let Some(header) = message.header() {
                    let name = header
                        .known_type()
                        .map(|t| format!("{:?}", t))
                        .unwrap_or_else(|| "unknown".to_string());
                    lines.push(format!(
                        "Message:     version {} type {} ({})",
                        header.version, header.message_type, name
                    ));
                }
                lines.join("\n")
            }
            Ok(ParseOutcome::NotProtocol) => {
                format!("Transaction: {}\nResult:      no protocol payload", txid)
            }
            Err(e) => format!("Transaction: {}\nError:       {}", txid, e),
        }),
    }
}
