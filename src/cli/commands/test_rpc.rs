use super::{ConfigArgs, RpcArgs};
use crate::errors::{AppError, AppResult};
use crate::rpc::BitcoinRpcClient;
use clap::Args;
use tracing::{error, info};

/// Test Bitcoin RPC connectivity
#[derive(Args)]
pub struct TestRpcCommand {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl TestRpcCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing Bitcoin RPC Connection ===");

        let rpc_config = self.rpc.apply(self.config.load()?.bitcoin_rpc);
        info!("Testing connection to: {}", rpc_config.url);
        info!("Username: {}", rpc_config.username);

        let client = match BitcoinRpcClient::new(rpc_config).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to create RPC client: {}", e);
                println!("Bitcoin RPC connection test FAILED");
                println!("Error: {}", e);
                println!("\nTroubleshooting tips:");
                println!("1. Check that Bitcoin Core is running");
                println!("2. Verify the RPC URL is correct");
                println!("3. Ensure RPC credentials are valid");
                println!("4. Check that RPC server is enabled in bitcoin.conf");
                return Err(AppError::Rpc(e));
            }
        };

        match client.test_connection().await {
            Ok(info) => {
                println!("Bitcoin RPC connection test PASSED");
                println!("Chain: {}, blocks: {}", info.chain, info.blocks);
                Ok(())
            }
            Err(e) => {
                error!("RPC connection test failed: {}", e);
                Err(AppError::Rpc(e))
            }
        }
    }
}
