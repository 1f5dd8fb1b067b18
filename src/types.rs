//! Omni Layer Codec - Type System
//!
//! - `common`: Shared types used across all components (EncodingClass, ParsedMessage, etc.)
//! - `params`: Network constants and height-gated activation rules
//! - `omni`: Omni Layer protocol constants, message types and the Class A decode table

mod common;
pub mod omni;
pub mod params;

pub use common::*;
pub use params::{ActivationRules, AddressVersions, ProtocolParams};
