/// Cryptographic utilities for the Omni Layer encodings
///
/// This module provides the chained SHA256 keystream used to obfuscate and
/// deobfuscate Class B packets.
pub mod obfuscation;

pub use obfuscation::{apply_keystream, ObfuscationHashes};
