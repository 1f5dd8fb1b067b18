use super::{ConfigArgs, OutputFormat, RpcArgs};
use crate::decoder::inspect_transaction;
use crate::errors::{AppError, AppResult};
use crate::rpc::{parse_txid, BitcoinRpcClient};
use clap::Args;
use tracing::info;

/// Show every step of parsing a transaction: script classes, class decision,
/// sender and Class B packets
#[derive(Args)]
pub struct InspectCommand {
    /// Transaction ID to inspect
    pub txid: String,

    /// Height of the block containing the transaction
    #[arg(long)]
    pub height: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl InspectCommand {
    pub async fn run(&self) -> AppResult<()> {
        let (config, params) = self.config.protocol_params()?;
        let txid = parse_txid(&self.txid)?;
        let client = BitcoinRpcClient::new(self.rpc.apply(config.bitcoin_rpc)).await?;

        info!("Inspecting {} at height {}", txid, self.height);
        let inspection = inspect_transaction(&txid, &client, self.height, &params)
            .await
            .map_err(|e| AppError::InvalidData(format!("{:#}", e)))?;

        match self.format {
            OutputFormat::Text => print!("{}", inspection.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inspection)?),
        }
        Ok(())
    }
}
