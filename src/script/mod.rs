//! Script classification and address handling
//!
//! This module is the single source of truth for "is this a standard single-address
//! output" across the codec:
//! - **classify** - Determine the standard type of an output or input script
//! - **address** - Base58Check destinations for the configured network
//!
//! The encoding-class classifier, the reference identification and the sender
//! resolver all go through these functions so they cannot disagree.

pub mod address;
pub mod classify;

pub use address::{
    address_of, decode_address, exodus_destination, is_exodus, script_for_address, Destination,
};
pub use classify::{classify, is_valid_pubkey_size, ScriptClass};
