//! Transaction inspection
//!
//! Diagnostic view of a parse, used by the `inspect` command. Fetches through the
//! RPC client and reports with `anyhow` context, unlike the typed core.

pub mod inspect;

pub use inspect::{inspect, inspect_transaction, Inspection, OutputInspection};
