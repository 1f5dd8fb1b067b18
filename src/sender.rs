//! Sender resolution
//!
//! Two algorithms, selected by encoding class:
//! - **First-input** (Class C) - the address of input 0
//! - **Contribution-sum** (Class A and B) - the address that contributed the most
//!   value across all inputs, ties broken by the smallest address string
//!
//! Both only look at previous outputs resolved through [`CoinLookup`].

use crate::coins::{Coin, CoinLookup};
use crate::errors::{ParseError, ParseResult};
use crate::script::{address_of, classify};
use crate::types::{EncodingClass, ProtocolParams};
use bitcoin::{OutPoint, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// How the sender of a transaction is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAlgorithm {
    FirstInput,
    ContributionSum,
}

impl SenderAlgorithm {
    pub fn for_class(class: EncodingClass) -> Self {
        if class.uses_contribution_sum() {
            SenderAlgorithm::ContributionSum
        } else {
            SenderAlgorithm::FirstInput
        }
    }
}

impl fmt::Display for SenderAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderAlgorithm::FirstInput => write!(f, "first-input"),
            SenderAlgorithm::ContributionSum => write!(f, "contribution-sum"),
        }
    }
}

/// Resolve the sender with the algorithm of the encoding class
pub fn resolve_sender<C: CoinLookup + ?Sized>(
    tx: &Transaction,
    class: EncodingClass,
    height: u32,
    coins: &C,
    params: &ProtocolParams,
) -> ParseResult<String> {
    match SenderAlgorithm::for_class(class) {
        SenderAlgorithm::FirstInput => first_input(tx, height, coins, params),
        SenderAlgorithm::ContributionSum => contribution_sum(tx, height, coins, params),
    }
}

/// Address of the first input; other inputs are not inspected
pub fn first_input<C: CoinLookup + ?Sized>(
    tx: &Transaction,
    height: u32,
    coins: &C,
    params: &ProtocolParams,
) -> ParseResult<String> {
    let input = tx.input.first().ok_or_else(|| {
        ParseError::UnresolvableSender("transaction has no inputs".to_string())
    })?;
    let coin = coins.resolve(&input.previous_output)?;
    let address = input_address(&coin, &input.previous_output, height, params)?;
    debug!("First-input sender: {}", address);
    Ok(address)
}

/// Address with the largest summed input value
///
/// Every input must be an allowed pay-to-pubkey-hash or pay-to-script-hash output,
/// otherwise resolution fails.
pub fn contribution_sum<C: CoinLookup + ?Sized>(
    tx: &Transaction,
    height: u32,
    coins: &C,
    params: &ProtocolParams,
) -> ParseResult<String> {
    if tx.input.is_empty() {
        return Err(ParseError::UnresolvableSender(
            "transaction has no inputs".to_string(),
        ));
    }

    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for input in &tx.input {
        let coin = coins.resolve(&input.previous_output)?;
        let address = input_address(&coin, &input.previous_output, height, params)?;
        let total = totals.entry(address).or_insert(0);
        *total = total.saturating_add(coin.value);
    }

    // Ascending order: a later address only wins with a strictly larger total
    let mut sender: Option<(&String, u64)> = None;
    for (address, total) in &totals {
        if *total > sender.map_or(0, |(_, best)| best) {
            sender = Some((address, *total));
        }
    }

    match sender {
        Some((address, total)) => {
            debug!(
                "Contribution-sum sender: {} with {} sats from {} addresses",
                address,
                total,
                totals.len()
            );
            Ok(address.clone())
        }
        None => Err(ParseError::UnresolvableSender(
            "no input contributed any value".to_string(),
        )),
    }
}

/// Address of a spent coin, if its type is allowed as a sender at `height`
fn input_address(
    coin: &Coin,
    outpoint: &OutPoint,
    height: u32,
    params: &ProtocolParams,
) -> ParseResult<String> {
    let class = classify(&coin.script_pubkey);
    if !class.is_single_address() || !class.is_allowed(height, &params.activation) {
        return Err(ParseError::UnresolvableSender(format!(
            "input {} spends a {} output",
            outpoint,
            class.name()
        )));
    }
    address_of(&coin.script_pubkey, params).ok_or_else(|| {
        ParseError::UnresolvableSender(format!("input {} has no address", outpoint))
    })
}
