//! Omni Layer transaction codec
//!
//! Classifies Bitcoin transactions carrying Omni Layer payloads, extracts the
//! payload of each encoding class, resolves sender and receiver, and lays out
//! payloads as outputs in the encode direction.

pub mod cli;
pub mod coins;
pub mod config;
pub mod crypto;
pub mod decoder;
pub mod encoding;
pub mod errors;
pub mod parser;
pub mod rpc;
pub mod script;
pub mod sender;
pub mod types;

pub use coins::{Coin, CoinLookup, CoinView};
pub use encoding::{encode, EncodeRequest};
pub use errors::{AppError, AppResult, EncodeError, ParseError, ParseResult};
pub use parser::{parse, parse_batch};
pub use types::{EncodingClass, ParseOutcome, ParsedMessage, ProtocolParams};
