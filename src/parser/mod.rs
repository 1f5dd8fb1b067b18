//! Parse orchestration
//!
//! A parse runs in a fixed order and either produces a complete
//! [`ParsedMessage`] or fails without side effects:
//!
//! 1. classify the encoding class of the outputs
//! 2. resolve the sender with the class's algorithm
//! 3. decode the payload (Class B uses the sender as keystream seed)
//! 4. identify the receiver
//! 5. compute the fee from the resolved inputs
//!
//! The sender is resolved before any payload is decoded, so a malformed
//! payload whose sender cannot be resolved fails with `UnresolvableSender`.
//!
//! Every height-dependent decision is taken from `block_height` through the
//! [`ActivationRules`](crate::types::ActivationRules) in the protocol parameters.

pub mod batch;
pub mod reference;

pub use batch::parse_batch;
pub use reference::identify_receiver;

use crate::coins::CoinLookup;
use crate::encoding::{self, class_a, ClassDecision, DecodeContext};
use crate::errors::{ParseError, ParseResult};
use crate::script::address_of;
use crate::sender::resolve_sender;
use crate::types::{EncodingClass, ParseOutcome, ParsedMessage, ProtocolParams};
use bitcoin::Transaction;
use tracing::debug;

/// Parse a transaction into a protocol message
pub fn parse<C: CoinLookup + ?Sized>(
    tx: &Transaction,
    block_height: u32,
    block_time: u32,
    coins: &C,
    params: &ProtocolParams,
) -> ParseResult<ParseOutcome> {
    let txid = tx.compute_txid().to_string();

    let class = match encoding::classify_outputs(&tx.output, block_height, params) {
        ClassDecision::Class(class) => class,
        ClassDecision::NotProtocol => {
            debug!("{} carries no protocol payload", txid);
            return Ok(ParseOutcome::NotProtocol);
        }
        ClassDecision::NotActivated => {
            return Err(ParseError::ActivationNotReached {
                class: EncodingClass::C,
                height: block_height,
            })
        }
        ClassDecision::SplitMarker => {
            return Err(ParseError::MalformedPayload(
                "first null-data push does not carry the marker".to_string(),
            ))
        }
    };
    debug!("{} uses Class {}", txid, class);

    let sender = resolve_sender(tx, class, block_height, coins, params)?;

    let (payload, receiver) = match class {
        EncodingClass::A => {
            let decoded = class_a::decode(&tx.output, block_height, params)?;
            let receiver = tx
                .output
                .get(decoded.reference_vout)
                .and_then(|output| address_of(&output.script_pubkey, params));
            (decoded.payload, receiver)
        }
        EncodingClass::B | EncodingClass::C => {
            let ctx = DecodeContext {
                height: block_height,
                sender: Some(&sender),
                params,
            };
            let payload = encoding::decode(class, &tx.output, &ctx)?;
            let receiver = identify_receiver(&tx.output, &sender, block_height, params);
            (payload, receiver)
        }
    };

    let fee = compute_fee(tx, coins)?;

    debug!(
        "{}: sender {}, receiver {:?}, {} payload bytes, fee {}",
        txid,
        sender,
        receiver,
        payload.len(),
        fee
    );

    Ok(ParseOutcome::Message(ParsedMessage {
        txid,
        sender,
        receiver,
        fee,
        payload,
        encoding_class: class,
        block_height,
        block_time,
    }))
}

/// Sum of resolved input values minus sum of output values
///
/// Both sums saturate at `i64::MAX`; values above it never occur on chain.
pub fn compute_fee<C: CoinLookup + ?Sized>(tx: &Transaction, coins: &C) -> ParseResult<i64> {
    let mut inputs: i64 = 0;
    for input in &tx.input {
        let coin = coins.resolve(&input.previous_output)?;
        inputs = inputs.saturating_add(i64::try_from(coin.value).unwrap_or(i64::MAX));
    }
    let outputs = tx.output.iter().fold(0i64, |sum, output| {
        sum.saturating_add(i64::try_from(output.value.to_sat()).unwrap_or(i64::MAX))
    });
    Ok(inputs.saturating_sub(outputs))
}
