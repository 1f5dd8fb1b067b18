use crate::script::classify::{classify, ScriptClass};
use crate::types::{AddressVersions, ProtocolParams};
use bitcoin::base58;
use bitcoin::hashes::Hash;
use bitcoin::{PubkeyHash, Script, ScriptBuf, ScriptHash};

/// Destination of a standard single-address script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    PubkeyHash([u8; 20]),
    ScriptHash([u8; 20]),
}

impl Destination {
    /// Destination of a classified script, if it is a single-address type
    pub fn from_class(class: &ScriptClass) -> Option<Self> {
        match class {
            ScriptClass::PubkeyHash(hash) => Some(Destination::PubkeyHash(*hash)),
            ScriptClass::ScriptHash(hash) => Some(Destination::ScriptHash(*hash)),
            _ => None,
        }
    }

    /// Parse a Base58Check address using the network's version bytes
    pub fn from_address(address: &str, versions: &AddressVersions) -> Option<Self> {
        let data = base58::decode_check(address).ok()?;
        if data.len() != 21 {
            return None;
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[1..]);

        if data[0] == versions.pubkey_hash {
            Some(Destination::PubkeyHash(hash))
        } else if versions.is_script_hash(data[0]) {
            Some(Destination::ScriptHash(hash))
        } else {
            None
        }
    }

    /// The 20-byte hash behind the destination
    pub fn hash(&self) -> &[u8; 20] {
        match self {
            Destination::PubkeyHash(hash) | Destination::ScriptHash(hash) => hash,
        }
    }

    /// Canonical address string
    pub fn to_address(&self, versions: &AddressVersions) -> String {
        let (version, hash) = match self {
            Destination::PubkeyHash(hash) => (versions.pubkey_hash, hash),
            Destination::ScriptHash(hash) => (versions.script_hash, hash),
        };
        let mut data = Vec::with_capacity(21);
        data.push(version);
        data.extend_from_slice(hash);
        base58::encode_check(&data)
    }

    pub fn script_pubkey(&self) -> ScriptBuf {
        match self {
            Destination::PubkeyHash(hash) => {
                ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(*hash))
            }
            Destination::ScriptHash(hash) => {
                ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(*hash))
            }
        }
    }
}

/// Address of a P2PKH or P2SH script; `None` for every other class
pub fn address_of(script: &Script, params: &ProtocolParams) -> Option<String> {
    Destination::from_class(&classify(script))
        .map(|destination| destination.to_address(&params.address_versions))
}

/// Parse an address of the configured network
pub fn decode_address(address: &str, params: &ProtocolParams) -> Option<Destination> {
    Destination::from_address(address, &params.address_versions)
}

/// Script paying an address of the configured network
pub fn script_for_address(address: &str, params: &ProtocolParams) -> Option<ScriptBuf> {
    decode_address(address, params).map(|destination| destination.script_pubkey())
}

/// The configured Exodus address as a destination
pub fn exodus_destination(params: &ProtocolParams) -> Option<Destination> {
    decode_address(&params.exodus_address, params)
}

/// Whether a script pays the configured Exodus address
pub fn is_exodus(script: &Script, params: &ProtocolParams) -> bool {
    address_of(script, params).as_deref() == Some(params.exodus_address.as_str())
}
