use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Omni Layer transaction codec
#[derive(Parser)]
#[command(name = "omni-codec")]
#[command(about = "Classify, decode and encode Omni Layer Class A/B/C transactions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch transactions over RPC and decode their payloads
    Decode(commands::decode::DecodeCommand),
    /// Decode a raw transaction offline
    DecodeRaw(commands::decode_raw::DecodeRawCommand),
    /// Show every parse step for a transaction fetched over RPC
    Inspect(commands::inspect::InspectCommand),
    /// Encode a payload as Class A, B or C outputs
    Encode(commands::encode::EncodeCommand),
    /// Test Bitcoin RPC connectivity
    TestRpc(commands::test_rpc::TestRpcCommand),
    /// Print the effective configuration
    ShowConfig(commands::show_config::ShowConfigCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(command) => command.run().await,
        Commands::DecodeRaw(command) => command.run(),
        Commands::Inspect(command) => command.run().await,
        Commands::Encode(command) => command.run(),
        Commands::TestRpc(command) => command.run().await,
        Commands::ShowConfig(command) => command.run(),
    }
}
