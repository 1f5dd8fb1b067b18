use crate::types::omni::MessageHeader;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three historical, mutually exclusive payload embedding schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingClass {
    /// Data hidden in the destination hashes of pay-to-address outputs
    A,
    /// Obfuscated packets carried as fake public keys of bare multisig outputs
    B,
    /// Marker-tagged null-data outputs
    C,
}

impl EncodingClass {
    /// Whether this class resolves its sender with the contribution-sum algorithm
    pub fn uses_contribution_sum(&self) -> bool {
        matches!(self, EncodingClass::A | EncodingClass::B)
    }
}

impl fmt::Display for EncodingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncodingClass::A => "A",
            EncodingClass::B => "B",
            EncodingClass::C => "C",
        };
        write!(f, "{}", name)
    }
}

/// Decoded protocol message, built once by the parse orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub txid: String,
    pub sender: String,
    /// Absent when the transaction has no identifiable second party
    pub receiver: Option<String>,
    /// Sum of resolved input values minus sum of output values
    pub fee: i64,
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
    pub encoding_class: EncodingClass,
    pub block_height: u32,
    pub block_time: u32,
}

impl ParsedMessage {
    /// Payload as lowercase hex
    pub fn payload_hex(&self) -> String {
        hex::encode(&self.payload)
    }

    /// Version and type tag at the front of the payload, if it is long enough
    pub fn header(&self) -> Option<MessageHeader> {
        MessageHeader::parse(&self.payload)
    }
}

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    /// The transaction carries a protocol payload
    Message(ParsedMessage),
    /// The transaction carries no payload; nothing to decode
    NotProtocol,
}

impl ParseOutcome {
    pub fn message(&self) -> Option<&ParsedMessage> {
        match self {
            ParseOutcome::Message(message) => Some(message),
            ParseOutcome::NotProtocol => None,
        }
    }

    pub fn into_message(self) -> Option<ParsedMessage> {
        match self {
            ParseOutcome::Message(message) => Some(message),
            ParseOutcome::NotProtocol => None,
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, ParseOutcome::Message(_))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
