use crate::coins::CoinView;
use crate::config::BitcoinRpcConfig;
use crate::errors::{RpcError, RpcResult};
use crate::rpc::{execute_with_timeout, is_not_found, RetryPolicy, TransactionCache};
use bitcoin::{Transaction, Txid};
use corepc_client::client_sync::{v28::Client, Auth};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// RPC request types for the async worker pattern
#[derive(Debug)]
pub enum RpcRequest {
    GetTransaction {
        txid: Txid,
        tx: oneshot::Sender<RpcResult<Transaction>>,
    },
    TestConnection {
        tx: oneshot::Sender<RpcResult<ChainInfo>>,
    },
}

/// Summary of the node's chain state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
}

/// Parse a txid string as given on the command line
pub fn parse_txid(txid: &str) -> RpcResult<Txid> {
    Txid::from_str(txid).map_err(|_| RpcError::InvalidTxid {
        txid: txid.to_string(),
    })
}

/// Deserialise a consensus-encoded transaction from hex
pub fn decode_raw_transaction(raw_hex: &str) -> RpcResult<Transaction> {
    let bytes = hex::decode(raw_hex.trim()).map_err(|e| {
        RpcError::DeserialisationFailed(format!("Failed to decode raw transaction hex: {}", e))
    })?;
    bitcoin::consensus::deserialize(&bytes).map_err(|e| {
        RpcError::DeserialisationFailed(format!("Failed to deserialise raw transaction: {}", e))
    })
}

/// Bitcoin RPC client with robust retry logic and async worker pattern
pub struct BitcoinRpcClient {
    request_tx: mpsc::Sender<RpcRequest>,
    error_count: Arc<AtomicU64>,
    cache: TransactionCache,
    concurrent_requests: usize,
}

impl BitcoinRpcClient {
    /// Create a new RPC client and spawn the worker task
    pub async fn new(config: BitcoinRpcConfig) -> RpcResult<Self> {
        let (request_tx, request_rx) = mpsc::channel(100);
        let error_count = Arc::new(AtomicU64::new(0));

        // Test connection before starting worker
        let test_client = Self::create_sync_client(&config)?;
        tokio::task::spawn_blocking({
            let client = test_client.clone();
            move || -> RpcResult<()> {
                client.get_blockchain_info().map_err(|e| {
                    RpcError::ConnectionFailed(format!(
                        "Failed to connect to Bitcoin RPC - check URL, credentials, and that Bitcoin Core is running: {}",
                        e
                    ))
                })?;
                Ok(())
            }
        })
        .await
        .map_err(|e| RpcError::ConnectionFailed(format!("Connection test task failed: {}", e)))??;

        info!("Bitcoin RPC connection established successfully");

        let cache = TransactionCache::new();
        let concurrent_requests = config.concurrent_requests;
        let worker = RpcWorker::new(config, test_client, Arc::clone(&error_count), cache.clone());
        tokio::spawn(worker.run(request_rx));

        Ok(Self {
            request_tx,
            error_count,
            cache,
            concurrent_requests,
        })
    }

    /// Get a transaction with retry logic and caching
    pub async fn get_transaction(&self, txid: &Txid) -> RpcResult<Transaction> {
        if let Some(cached_tx) = self.cache.get(txid) {
            return Ok(cached_tx);
        }

        let (tx, rx) = oneshot::channel();
        self.request_tx
            .send(RpcRequest::GetTransaction { txid: *txid, tx })
            .await
            .map_err(|_| RpcError::ConnectionFailed("Failed to send RPC request".to_string()))?;

        rx.await
            .map_err(|_| RpcError::ConnectionFailed("RPC worker channel closed".to_string()))?
    }

    /// Test RPC connection
    pub async fn test_connection(&self) -> RpcResult<ChainInfo> {
        let (tx, rx) = oneshot::channel();

        self.request_tx
            .send(RpcRequest::TestConnection { tx })
            .await
            .map_err(|_| RpcError::ConnectionFailed("Failed to send RPC request".to_string()))?;

        rx.await
            .map_err(|_| RpcError::ConnectionFailed("RPC worker channel closed".to_string()))?
    }

    /// Snapshot of the previous outputs spent by `transaction`
    ///
    /// Previous transactions are fetched concurrently. One that cannot be found is
    /// left out of the view, so the parse reports the unresolvable input itself.
    /// Other RPC failures abort the snapshot.
    pub async fn fetch_coin_view(&self, transaction: &Transaction) -> RpcResult<CoinView> {
        let prev_txids: BTreeSet<Txid> = transaction
            .input
            .iter()
            .filter(|input| !input.previous_output.is_null())
            .map(|input| input.previous_output.txid)
            .collect();

        let fetched = futures::future::join_all(
            prev_txids
                .iter()
                .map(|txid| async move { (*txid, self.get_transaction(txid).await) }),
        )
        .await;

        let mut view = CoinView::new();
        for (txid, result) in fetched {
            match result {
                Ok(prev_tx) => view.add_transaction(&prev_tx),
                Err(RpcError::TransactionNotFound { .. }) => {
                    warn!("Previous transaction {} not found, input left unresolved", txid);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Resolved {} previous outputs from {} transactions for {}",
            view.len(),
            prev_txids.len(),
            transaction.compute_txid()
        );
        Ok(view)
    }

    /// Get the current error count from RPC operations
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Get cache statistics
    pub fn get_cache_stats(&self) -> crate::rpc::CacheStats {
        self.cache.get_stats()
    }

    /// Get the configured concurrent request limit
    pub fn get_concurrent_limit(&self) -> usize {
        self.concurrent_requests
    }

    /// Create synchronous client for worker use
    fn create_sync_client(config: &BitcoinRpcConfig) -> RpcResult<Arc<Client>> {
        let auth = Auth::UserPass(config.username.clone(), config.password.clone());
        let client = Client::new_with_auth(&config.url, auth).map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to create Bitcoin RPC client: {}", e))
        })?;

        Ok(Arc::new(client))
    }
}

/// RPC worker that handles all Bitcoin Core communication in a dedicated task
#[derive(Clone)]
struct RpcWorker {
    client: Arc<Client>,
    policy: RetryPolicy,
    concurrent_requests: usize,
    semaphore: Arc<Semaphore>,
    error_count: Arc<AtomicU64>,
    cache: TransactionCache,
}

impl RpcWorker {
    fn new(
        config: BitcoinRpcConfig,
        client: Arc<Client>,
        error_count: Arc<AtomicU64>,
        cache: TransactionCache,
    ) -> Self {
        Self {
            client,
            policy: RetryPolicy::from(&config),
            concurrent_requests: config.concurrent_requests,
            semaphore: Arc::new(Semaphore::new(config.concurrent_requests.max(1))),
            error_count,
            cache,
        }
    }

    async fn run(self, mut request_rx: mpsc::Receiver<RpcRequest>) {
        info!(
            "RPC worker started with {} concurrent request limit",
            self.concurrent_requests
        );

        while let Some(request) = request_rx.recv().await {
            let worker = self.clone();

            // Spawn each request in its own task for parallel processing
            tokio::spawn(async move {
                worker.handle_request(request).await;
            });
        }

        info!("RPC worker shutting down");
    }

    async fn handle_request(&self, request: RpcRequest) {
        match request {
            RpcRequest::GetTransaction { txid, tx } => {
                let result = self.get_transaction_with_retry(txid).await;
                let _ = tx.send(result);
            }
            RpcRequest::TestConnection { tx } => {
                let result = self.test_connection_impl().await;
                let _ = tx.send(result);
            }
        }
    }

    async fn get_transaction_with_retry(&self, txid: Txid) -> RpcResult<Transaction> {
        let _permit = self.semaphore.acquire().await.map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to acquire semaphore: {}", e))
        })?;

        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            let client = Arc::clone(&self.client);
            let outcome = execute_with_timeout(
                self.policy.timeout_seconds,
                move || -> RpcResult<Transaction> {
                    let raw = client
                        .get_raw_transaction(txid)
                        .map_err(|e| RpcError::CallFailed {
                            method: "getrawtransaction".to_string(),
                            message: e.to_string(),
                        })?;
                    decode_raw_transaction(&raw.0)
                },
            )
            .await;

            let failure = match outcome {
                Ok(Ok(Ok(transaction))) => {
                    if attempt > 1 {
                        debug!(
                            "Retrieved transaction {} after {} attempts",
                            txid, attempt
                        );
                    }
                    self.cache.put(transaction.clone());
                    return Ok(transaction);
                }
                Ok(Ok(Err(e))) => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    if is_not_found(&e.to_string()) {
                        debug!("Transaction {} not found (non-retryable): {}", txid, e);
                        return Err(RpcError::TransactionNotFound {
                            txid: txid.to_string(),
                        });
                    }
                    if matches!(e, RpcError::DeserialisationFailed(_)) {
                        return Err(e);
                    }
                    e
                }
                Ok(Err(e)) => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    error!("Spawn blocking error for transaction {}: {}", txid, e);
                    return Err(RpcError::CallFailed {
                        method: "spawn_blocking".to_string(),
                        message: format!("Task execution error: {}", e),
                    });
                }
                Err(_) => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    RpcError::Timeout {
                        timeout_seconds: self.policy.timeout_seconds,
                        operation: format!("getrawtransaction({})", txid),
                    }
                }
            };

            if attempt < attempts {
                let backoff = self.policy.backoff_after(attempt);
                warn!(
                    "RPC attempt {} failed for transaction {}, retrying in {:?}: {}",
                    attempt, txid, backoff, failure
                );
                sleep(backoff).await;
            }
            last_error = Some(failure);
        }

        error!(
            "Failed to get transaction {} after {} attempts: {:?}",
            txid, attempts, last_error
        );
        Err(match last_error {
            Some(timeout @ RpcError::Timeout { .. }) => timeout,
            _ => RpcError::MaxRetriesExceeded {
                operation: format!("getrawtransaction({})", txid),
            },
        })
    }

    async fn test_connection_impl(&self) -> RpcResult<ChainInfo> {
        let client = Arc::clone(&self.client);

        match execute_with_timeout(self.policy.timeout_seconds, move || -> RpcResult<ChainInfo> {
            let info = client
                .get_blockchain_info()
                .map_err(|e| RpcError::CallFailed {
                    method: "getblockchaininfo".to_string(),
                    message: e.to_string(),
                })?;
            debug!(
                "Bitcoin Core connection test successful - chain: {}, blocks: {}",
                info.chain, info.blocks
            );
            Ok(ChainInfo {
                chain: info.chain.to_string(),
                blocks: info.blocks as u64,
            })
        })
        .await
        {
            Ok(result) => result.map_err(|e| RpcError::CallFailed {
                method: "spawn_blocking".to_string(),
                message: format!("Connection test task failed: {}", e),
            })?,
            Err(_) => Err(RpcError::Timeout {
                timeout_seconds: self.policy.timeout_seconds,
                operation: "connection_test".to_string(),
            }),
        }
    }
}
