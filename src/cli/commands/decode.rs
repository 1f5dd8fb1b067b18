use super::{render_result, ConfigArgs, OutputFormat, RpcArgs};
use crate::coins::CoinView;
use crate::errors::{AppError, AppResult};
use crate::parser::parse_batch;
use crate::rpc::{parse_txid, BitcoinRpcClient};
use clap::Args;
use tracing::{error, info};

/// Fetch transactions and their previous outputs over RPC and decode them
#[derive(Args)]
pub struct DecodeCommand {
    /// Transaction IDs to decode (all must be confirmed at --height)
    #[arg(required = true)]
    pub txids: Vec<String>,

    /// Height of the block containing the transactions
    #[arg(long)]
    pub height: u32,

    /// Timestamp of the block containing the transactions
    #[arg(long, default_value_t = 0)]
    pub time: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl DecodeCommand {
    pub async fn run(&self) -> AppResult<()> {
        let (config, params) = self.config.protocol_params()?;
        let txids = self
            .txids
            .iter()
            .map(|txid| parse_txid(txid))
            .collect::<Result<Vec<_>, _>>()?;

        let client = BitcoinRpcClient::new(self.rpc.apply(config.bitcoin_rpc.clone()))
            .await
            .map_err(|e| {
                error!("Failed to create RPC client: {}", e);
                AppError::from(e)
            })?;

        let mut transactions = Vec::with_capacity(txids.len());
        let mut coins = CoinView::new();
        for txid in &txids {
            let tx = client.get_transaction(txid).await?;
            coins.merge(client.fetch_coin_view(&tx).await?);
            transactions.push(tx);
        }
        info!(
            "Fetched {} transactions and {} previous outputs ({:.1}% cache hits)",
            transactions.len(),
            coins.len(),
            client.get_cache_stats().hit_rate()
        );

        let results = parse_batch(
            &transactions,
            self.height,
            self.time,
            &coins,
            &params,
            config.processing.threads,
        )?;

        let rendered = txids
            .iter()
            .zip(&results)
            .map(|(txid, result)| render_result(&txid.to_string(), result, self.format))
            .collect::<AppResult<Vec<_>>>()?;

        match self.format {
            OutputFormat::Text => println!("{}", rendered.join("\n\n")),
            OutputFormat::Json if rendered.len() == 1 => println!("{}", rendered[0]),
            OutputFormat::Json => println!("[\n{}\n]", rendered.join(",\n")),
        }
        Ok(())
    }
}
