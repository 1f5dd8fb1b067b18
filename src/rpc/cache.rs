use bitcoin::{Transaction, Txid};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Thread-safe transaction cache for avoiding duplicate RPC calls
///
/// Previous transactions are shared between many spends, so resolving the coins
/// of a batch hits the cache far more often than the node.
#[derive(Clone, Default)]
pub struct TransactionCache {
    cache: Arc<Mutex<HashMap<Txid, Transaction>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl TransactionCache {
    /// Create a new empty transaction cache
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are inserted whole, so a poisoned map is still consistent
    fn entries(&self) -> MutexGuard<'_, HashMap<Txid, Transaction>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a transaction from cache if it exists
    pub fn get(&self, txid: &Txid) -> Option<Transaction> {
        match self.entries().get(txid) {
            Some(transaction) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for transaction: {}", txid);
                Some(transaction.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for transaction: {}", txid);
                None
            }
        }
    }

    /// Store a transaction under its own txid
    pub fn put(&self, transaction: Transaction) {
        let txid = transaction.compute_txid();
        self.entries().insert(txid, transaction);
        debug!("Cached transaction: {}", txid);
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn size(&self) -> usize {
        self.entries().len()
    }

    pub fn clear(&self) {
        self.entries().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// Cache performance statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }

    /// Get total cache requests
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
