//! Payload assembly for the three Omni Layer encoding classes
//!
//! - **classify** - Decide which class (if any) a transaction's outputs use
//! - **class_a** - Data hidden in destination hashes of pay-to-address outputs
//! - **class_b** - Obfuscated packets in fake keys of bare multisig outputs
//! - **class_c** - Marker-tagged null-data outputs
//!
//! Decoders never return a partial payload: every structural problem is a
//! [`ParseError::MalformedPayload`].

pub mod class_a;
pub mod class_b;
pub mod class_c;
pub mod classify;

pub use classify::{classify_outputs, ClassDecision};

use crate::errors::{EncodeResult, ParseError, ParseResult};
use crate::types::{EncodingClass, ProtocolParams};
use bitcoin::TxOut;
use serde::{Deserialize, Serialize};

/// Everything a decoder needs besides the outputs themselves
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub height: u32,
    /// Resolved sender; required by Class B as the keystream seed
    pub sender: Option<&'a str>,
    pub params: &'a ProtocolParams,
}

/// Extract the payload of an already-classified transaction
pub fn decode(
    class: EncodingClass,
    outputs: &[TxOut],
    ctx: &DecodeContext<'_>,
) -> ParseResult<Vec<u8>> {
    match class {
        EncodingClass::A => {
            class_a::decode(outputs, ctx.height, ctx.params).map(|decoded| decoded.payload)
        }
        EncodingClass::B => {
            let sender = ctx.sender.ok_or_else(|| {
                ParseError::UnresolvableSender("Class B decode requires a sender".to_string())
            })?;
            class_b::decode(outputs, sender, ctx.height, ctx.params)
        }
        EncodingClass::C => class_c::decode(outputs, ctx.height, ctx.params),
    }
}

/// Request to lay out a payload as transaction outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum EncodeRequest {
    /// Simple send of MSC or TMSC to `receiver`
    ClassA { receiver: String, payload: Vec<u8> },
    /// Multisig packets obfuscated with the `sender` keystream
    ClassB {
        sender: String,
        redeeming_pubkey: Vec<u8>,
        payload: Vec<u8>,
    },
    /// Null-data pushes, optionally followed by a receiver output
    ClassC {
        receiver: Option<String>,
        payload: Vec<u8>,
    },
}

impl EncodeRequest {
    pub fn class(&self) -> EncodingClass {
        match self {
            EncodeRequest::ClassA { .. } => EncodingClass::A,
            EncodeRequest::ClassB { .. } => EncodingClass::B,
            EncodeRequest::ClassC { .. } => EncodingClass::C,
        }
    }
}

/// Build the protocol outputs for a request
pub fn encode(request: &EncodeRequest, params: &ProtocolParams) -> EncodeResult<Vec<TxOut>> {
    match request {
        EncodeRequest::ClassA { receiver, payload } => {
            class_a::encode(receiver, payload, params)
        }
        EncodeRequest::ClassB {
            sender,
            redeeming_pubkey,
            payload,
        } => class_b::encode(sender, redeeming_pubkey, payload, params),
        EncodeRequest::ClassC { receiver, payload } => {
            class_c::encode(payload, receiver.as_deref(), params)
        }
    }
}
