//! Coin lookup: resolving the previous outputs a transaction spends
//!
//! The sender resolver and the fee calculation only ever see what the inputs
//! consume, never values declared by the spending transaction. Callers provide any
//! consistent snapshot through [`CoinLookup`]; [`CoinView`] is the in-memory one.

pub use crate::errors::CoinLookupError;
use bitcoin::{Amount, OutPoint, ScriptBuf, Transaction, TxOut};
use std::collections::HashMap;

/// A previous output: its script and value in satoshis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub script_pubkey: ScriptBuf,
    pub value: u64,
}

impl Coin {
    pub fn new(script_pubkey: ScriptBuf, value: u64) -> Self {
        Self {
            script_pubkey,
            value,
        }
    }
}

impl From<TxOut> for Coin {
    fn from(output: TxOut) -> Self {
        Self {
            script_pubkey: output.script_pubkey,
            value: output.value.to_sat(),
        }
    }
}

impl From<&Coin> for TxOut {
    fn from(coin: &Coin) -> Self {
        TxOut {
            value: Amount::from_sat(coin.value),
            script_pubkey: coin.script_pubkey.clone(),
        }
    }
}

/// Resolves an outpoint to the output it refers to
pub trait CoinLookup {
    fn resolve(&self, outpoint: &OutPoint) -> Result<Coin, CoinLookupError>;
}

impl<T: CoinLookup + ?Sized> CoinLookup for &T {
    fn resolve(&self, outpoint: &OutPoint) -> Result<Coin, CoinLookupError> {
        (**self).resolve(outpoint)
    }
}

/// Immutable in-memory snapshot of previous outputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinView {
    coins: HashMap<OutPoint, Coin>,
}

impl CoinView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, outpoint: OutPoint, coin: Coin) {
        self.coins.insert(outpoint, coin);
    }

    /// Add every output of a transaction
    pub fn add_transaction(&mut self, transaction: &Transaction) {
        let txid = transaction.compute_txid();
        for (vout, output) in transaction.output.iter().enumerate() {
            self.coins
                .insert(OutPoint::new(txid, vout as u32), output.clone().into());
        }
    }

    /// Take every coin of another snapshot, replacing entries for the same outpoint
    pub fn merge(&mut self, other: CoinView) {
        self.coins.extend(other.coins);
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.coins.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

impl CoinLookup for CoinView {
    fn resolve(&self, outpoint: &OutPoint) -> Result<Coin, CoinLookupError> {
        self.coins
            .get(outpoint)
            .cloned()
            .ok_or(CoinLookupError::NotFound(*outpoint))
    }
}

impl FromIterator<(OutPoint, Coin)> for CoinView {
    fn from_iter<I: IntoIterator<Item = (OutPoint, Coin)>>(iter: I) -> Self {
        Self {
            coins: iter.into_iter().collect(),
        }
    }
}
