//! Bitcoin Core RPC integration module
//!
//! Supplies the coin snapshot a parse needs when transactions come from a node:
//! - **Client** - Async Bitcoin Core RPC client with retry logic
//! - **Cache** - Transaction caching for RPC responses
//! - **Retry** - Exponential backoff policy and timeout wrapper
//!
//! The RPC client uses the `corepc-client` crate and implements an async
//! worker pattern with channel-based request/response handling.

pub mod cache;
pub mod client;
pub mod retry;

// Re-export main types
pub use cache::{CacheStats, TransactionCache};
pub use client::{decode_raw_transaction, parse_txid, BitcoinRpcClient, ChainInfo, RpcRequest};
pub use retry::{calculate_next_backoff, execute_with_timeout, is_not_found, RetryPolicy};
