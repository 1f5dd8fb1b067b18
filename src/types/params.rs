//! Network constants and height-gated activation rules
//!
//! Everything that differs between chains lives in [`ProtocolParams`] and is
//! threaded explicitly through every classification, decode and sender call.
//! Nothing in the codec reads a global network flag.

use crate::types::omni::{
    DEFAULT_DUST_VALUE, EXODUS_ADDRESS, MAX_PACKETS, MAX_SCRIPT_ELEMENT_SIZE, OMNI_MARKER,
    PACKET_SIZE, PACKET_SIZE_CLASS_A, TESTNET_EXODUS_ADDRESS,
};
use serde::{Deserialize, Serialize};

/// Block heights at which output types become visible to the protocol
///
/// Pay-to-pubkey-hash is always allowed. The other gates are inclusive: a rule is
/// active at `height >= activation height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRules {
    pub null_data_height: u32,
    pub script_hash_height: u32,
    pub multisig_height: u32,
}

impl ActivationRules {
    /// Every gate open from genesis (test networks)
    pub fn all_active() -> Self {
        Self {
            null_data_height: 0,
            script_hash_height: 0,
            multisig_height: 0,
        }
    }

    pub fn null_data_active(&self, height: u32) -> bool {
        height >= self.null_data_height
    }

    pub fn script_hash_active(&self, height: u32) -> bool {
        height >= self.script_hash_height
    }

    pub fn multisig_active(&self, height: u32) -> bool {
        height >= self.multisig_height
    }
}

/// Base58Check version bytes of the network's standard addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressVersions {
    pub pubkey_hash: u8,
    /// Version used when rendering pay-to-script-hash destinations
    pub script_hash: u8,
    /// Additional versions accepted when decoding script-hash addresses
    #[serde(default)]
    pub legacy_script_hash: Vec<u8>,
}

impl AddressVersions {
    pub fn is_script_hash(&self, version: u8) -> bool {
        version == self.script_hash || self.legacy_script_hash.contains(&version)
    }
}

/// Complete set of network-specific protocol constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// 4-byte prefix identifying a Class C null-data payload
    pub marker: [u8; 4],
    /// Bytes per Class B packet, including its sequence byte
    pub packet_size: usize,
    /// Upper bound on packets per transaction
    pub max_packets: usize,
    /// Bytes of a Class A data packet
    pub class_a_packet_size: usize,
    /// Largest single push emitted by the Class C encoder
    pub max_push_size: usize,
    /// Value assigned to non-null-data outputs built by the encoders
    pub dust_value: u64,
    /// Fixed reference address marking Class A and B transactions
    pub exodus_address: String,
    pub address_versions: AddressVersions,
    pub activation: ActivationRules,
}

impl ProtocolParams {
    /// Bitcoin mainnet, as deployed
    pub fn bitcoin() -> Self {
        Self {
            marker: OMNI_MARKER,
            packet_size: PACKET_SIZE,
            max_packets: MAX_PACKETS,
            class_a_packet_size: PACKET_SIZE_CLASS_A,
            max_push_size: MAX_SCRIPT_ELEMENT_SIZE,
            dust_value: DEFAULT_DUST_VALUE,
            exodus_address: EXODUS_ADDRESS.to_string(),
            address_versions: AddressVersions {
                pubkey_hash: 0x00,
                script_hash: 0x05,
                legacy_script_hash: Vec::new(),
            },
            activation: ActivationRules {
                null_data_height: 395_000,
                script_hash_height: 322_000,
                multisig_height: 0,
            },
        }
    }

    pub fn testnet() -> Self {
        Self {
            exodus_address: TESTNET_EXODUS_ADDRESS.to_string(),
            address_versions: AddressVersions {
                pubkey_hash: 0x6f,
                script_hash: 0xc4,
                legacy_script_hash: Vec::new(),
            },
            activation: ActivationRules::all_active(),
            ..Self::bitcoin()
        }
    }

    pub fn regtest() -> Self {
        Self::testnet()
    }

    /// Look up a built-in preset by name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" | "main" => Some(Self::bitcoin()),
            "testnet" | "test" | "testnet3" => Some(Self::testnet()),
            "regtest" => Some(Self::regtest()),
            _ => None,
        }
    }

    /// Fixed maximum payload length (`MAX_PACKETS × PACKET_SIZE`)
    pub fn max_payload_size(&self) -> usize {
        self.max_packets * self.packet_size
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self::bitcoin()
    }
}
