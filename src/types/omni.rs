//! Omni Layer Protocol Constants and Types
//!
//! This module defines the protocol constants shared by all three encoding classes,
//! including the mandatory Exodus address, the Class C marker and the packet sizes.
//!
//! ## Exodus Address
//!
//! The Exodus address (`1EXoDusjGwvnjZUyKkxZ4UHEf77z6A5S4P`) is the foundation address
//! for the Omni Layer protocol. Class A and Class B transactions MUST include an output
//! to this address as a protocol marker. Other networks configure their own Exodus
//! address through [`ProtocolParams`](crate::types::ProtocolParams).
//!
//! ## Payload header
//!
//! Every payload starts with a big-endian `u16` version and `u16` message type. The
//! codec never interprets the rest; [`MessageHeader`] exposes the tag to callers.

use byteorder::{BigEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

// ============================================================================
// Exodus Address Constants (Omni Layer Protocol Marker)
// ============================================================================

/// Omni Layer Exodus address on Bitcoin mainnet
///
/// Address: 1EXoDusjGwvnjZUyKkxZ4UHEf77z6A5S4P
pub const EXODUS_ADDRESS: &str = "1EXoDusjGwvnjZUyKkxZ4UHEf77z6A5S4P";

/// Omni Layer Exodus address on testnet and regtest
pub const TESTNET_EXODUS_ADDRESS: &str = "mpexoDuSkGGqvqrkrjiFng38QPkJQVFyqv";

// ============================================================================
// Packet Constants
// ============================================================================

/// Class C marker: ASCII "omni"
pub const OMNI_MARKER: [u8; 4] = [0x6f, 0x6d, 0x6e, 0x69];

/// Bytes per Class B packet (1 sequence byte + 30 payload bytes)
pub const PACKET_SIZE: usize = 31;

/// Bytes per Class A packet
pub const PACKET_SIZE_CLASS_A: usize = 19;

/// Maximum number of packets in one transaction
pub const MAX_PACKETS: usize = 255;

/// Base chain limit for a single pushed script element
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Default value of encoder-built pay-to-address and multisig outputs
pub const DEFAULT_DUST_VALUE: u64 = 5460;

/// Property identifiers that Class A can carry
pub const PROPERTY_MSC: u32 = 1;
pub const PROPERTY_TMSC: u32 = 2;

// ============================================================================
// Message Types
// ============================================================================

/// Omni Layer message types carried in the payload header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmniMessageType {
    // Transfer Types
    SimpleSend = 0,      // Basic token transfer
    RestrictedSend = 2,  // Send with restrictions
    SendToOwners = 3,    // Distribute to all token holders
    SendAll = 4,         // Send all tokens of specified ecosystem
    SendNonFungible = 5, // NFT transfer
    SendToMany = 7,      // Several receivers in one message

    // Trading/Exchange
    TradeOffer = 20,             // DEX trade offer
    AcceptOfferBTC = 22,         // Accept BTC trade offer
    MetaDEXTrade = 25,           // MetaDEX trading
    MetaDEXCancelPrice = 26,     // Cancel by price
    MetaDEXCancelPair = 27,      // Cancel trading pair
    MetaDEXCancelEcosystem = 28, // Cancel ecosystem trades

    // Property Management
    CreatePropertyFixed = 50,    // Fixed supply token
    CreatePropertyVariable = 51, // Variable supply token
    PromoteProperty = 52,        // Promote to main ecosystem
    CloseCrowdsale = 53,         // End crowdsale
    CreatePropertyManual = 54,   // Manually managed token
    GrantPropertyTokens = 55,    // Issue additional tokens
    RevokePropertyTokens = 56,   // Destroy tokens

    // Administrative
    ChangeIssuerAddress = 70,     // Transfer token control
    EnableFreezing = 71,          // Enable address freezing
    DisableFreezing = 72,         // Disable address freezing
    FreezePropertyTokens = 185,   // Freeze specific address
    UnfreezePropertyTokens = 186, // Unfreeze address

    // Other
    Notification = 31, // General notification
    AnyData = 200,     // Arbitrary data storage
    FeatureActivation = 65534,
    Alert = 65535,
}

impl OmniMessageType {
    /// Convert from the raw header value
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::SimpleSend),
            2 => Some(Self::RestrictedSend),
            3 => Some(Self::SendToOwners),
            4 => Some(Self::SendAll),
            5 => Some(Self::SendNonFungible),
            7 => Some(Self::SendToMany),
            20 => Some(Self::TradeOffer),
            22 => Some(Self::AcceptOfferBTC),
            25 => Some(Self::MetaDEXTrade),
            26 => Some(Self::MetaDEXCancelPrice),
            27 => Some(Self::MetaDEXCancelPair),
            28 => Some(Self::MetaDEXCancelEcosystem),
            31 => Some(Self::Notification),
            50 => Some(Self::CreatePropertyFixed),
            51 => Some(Self::CreatePropertyVariable),
            52 => Some(Self::PromoteProperty),
            53 => Some(Self::CloseCrowdsale),
            54 => Some(Self::CreatePropertyManual),
            55 => Some(Self::GrantPropertyTokens),
            56 => Some(Self::RevokePropertyTokens),
            70 => Some(Self::ChangeIssuerAddress),
            71 => Some(Self::EnableFreezing),
            72 => Some(Self::DisableFreezing),
            185 => Some(Self::FreezePropertyTokens),
            186 => Some(Self::UnfreezePropertyTokens),
            200 => Some(Self::AnyData),
            65534 => Some(Self::FeatureActivation),
            65535 => Some(Self::Alert),
            _ => None,
        }
    }
}

/// Version and type tag at the front of every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub version: u16,
    pub message_type: u16,
}

impl MessageHeader {
    /// Read the header; `None` when the payload is shorter than 4 bytes
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(payload);
        let version = cursor.read_u16::<BigEndian>().ok()?;
        let message_type = cursor.read_u16::<BigEndian>().ok()?;
        Some(Self {
            version,
            message_type,
        })
    }

    pub fn known_type(&self) -> Option<OmniMessageType> {
        OmniMessageType::from_u16(self.message_type)
    }
}

// ============================================================================
// Class A decode table
// ============================================================================

/// The only properties a Class A transaction can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassAProperty {
    Msc,
    Tmsc,
}

impl ClassAProperty {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            PROPERTY_MSC => Some(Self::Msc),
            PROPERTY_TMSC => Some(Self::Tmsc),
            _ => None,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::Msc => PROPERTY_MSC,
            Self::Tmsc => PROPERTY_TMSC,
        }
    }
}

/// Closed set of messages representable in Class A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassAMessage {
    SimpleSend {
        property: ClassAProperty,
        amount: u64,
    },
}

impl ClassAMessage {
    /// Decode a Class A payload: version 0, type 0, MSC or TMSC, 8-byte amount
    pub fn decode(payload: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(payload);
        let version = cursor.read_u16::<BigEndian>().ok()?;
        let message_type = cursor.read_u16::<BigEndian>().ok()?;
        if version != 0 || message_type != OmniMessageType::SimpleSend as u16 {
            return None;
        }
        let property = ClassAProperty::from_id(cursor.read_u32::<BigEndian>().ok()?)?;
        let amount = cursor.read_u64::<BigEndian>().ok()?;
        Some(Self::SimpleSend { property, amount })
    }
}
