use super::{render_result, ConfigArgs, OutputFormat};
use crate::coins::{Coin, CoinView};
use crate::errors::{AppError, AppResult};
use crate::parser::parse;
use crate::rpc::{decode_raw_transaction, parse_txid};
use bitcoin::{OutPoint, ScriptBuf};
use clap::Args;
use tracing::info;

/// Decode a raw transaction offline, with its previous outputs given on the command line
#[derive(Args)]
pub struct DecodeRawCommand {
    /// Consensus-encoded transaction as hex
    pub raw_hex: String,

    /// Height of the block containing the transaction
    #[arg(long)]
    pub height: u32,

    /// Timestamp of the block containing the transaction
    #[arg(long, default_value_t = 0)]
    pub time: u32,

    /// Spent output as txid:vout:value:script_hex (repeat for every input)
    #[arg(long = "prevout")]
    pub prevouts: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl DecodeRawCommand {
    pub fn run(&self) -> AppResult<()> {
        let (_, params) = self.config.protocol_params()?;
        let tx = decode_raw_transaction(&self.raw_hex)?;
        let coins = self
            .prevouts
            .iter()
            .map(|prevout| parse_prevout(prevout))
            .collect::<AppResult<CoinView>>()?;

        let txid = tx.compute_txid().to_string();
        info!(
            "Decoding {} at height {} with {} previous outputs",
            txid,
            self.height,
            coins.len()
        );

        let result = parse(&tx, self.height, self.time, &coins, &params);
        println!("{}", render_result(&txid, &result, self.format)?);
        Ok(())
    }
}

/// Parse `txid:vout:value:script_hex`
pub fn parse_prevout(arg: &str) -> AppResult<(OutPoint, Coin)> {
    let invalid = |reason: &str| {
        AppError::InvalidData(format!(
            "Invalid prevout '{}': {} (expected txid:vout:value:script_hex)",
            arg, reason
        ))
    };

    let parts: Vec<&str> = arg.split(':').collect();
    let [txid, vout, value, script] = parts.as_slice() else {
        return Err(invalid("wrong number of fields"));
    };

    let txid = parse_txid(txid)?;
    let vout = vout.parse::<u32>().map_err(|_| invalid("vout is not a number"))?;
    let value = value.parse::<u64>().map_err(|_| invalid("value is not a number"))?;
    let script = ScriptBuf::from_hex(script).map_err(|_| invalid("script is not hex"))?;

    Ok((OutPoint::new(txid, vout), Coin::new(script, value)))
}
