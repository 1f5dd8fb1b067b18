//! Integration Tests Module
//!
//! End-to-end tests across the encoder, parser, batch worker pool and CLI.

pub mod cli_commands;
pub mod round_trip;
