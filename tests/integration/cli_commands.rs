//! CLI Commands
//!
//! Runs the offline commands the way the binary would after argument parsing:
//! decode-raw on a serialized transaction, encode, and show-config against a
//! temporary configuration file.

use crate::common::build_transaction;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::{Amount, TxOut};
use clap::Parser;
use omni_codec::cli::{Cli, Commands};
use omni_codec::script::Destination;
use omni_codec::{encode, EncodeRequest, ProtocolParams};
use std::io::Write;

fn run(args: &[&str]) -> omni_codec::AppResult<()> {
    let cli = Cli::try_parse_from(args).unwrap();
    match cli.command {
        Commands::DecodeRaw(command) => command.run(),
        Commands::Encode(command) => command.run(),
        Commands::ShowConfig(command) => command.run(),
        _ => panic!("only offline commands are exercised here"),
    }
}

/// Serialized Class C transaction and the prevout argument for its only input
fn class_c_transaction() -> (String, String) {
    let params = ProtocolParams::bitcoin();
    let outputs = encode(
        &EncodeRequest::ClassC {
            receiver: None,
            payload: hex::decode("00000000000000010000000000000064").unwrap(),
        },
        &params,
    )
    .unwrap();
    let input = TxOut {
        value: Amount::from_sat(10_000),
        script_pubkey: Destination::PubkeyHash([0x21; 20]).script_pubkey(),
    };
    let (tx, _) = build_transaction(&[input.clone()], outputs);

    let outpoint = tx.input[0].previous_output;
    let prevout = format!(
        "{}:{}:{}:{}",
        outpoint.txid,
        outpoint.vout,
        input.value.to_sat(),
        hex::encode(input.script_pubkey.as_bytes())
    );
    (serialize_hex(&tx), prevout)
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_decode_raw() {
    let (raw, prevout) = class_c_transaction();
    for format in ["text", "json"] {
        run(&[
            "omni-codec",
            "decode-raw",
            &raw,
            "--height",
            "400000",
            "--prevout",
            &prevout,
            "--format",
            format,
        ])
        .unwrap();
    }
}

#[test]
fn test_decode_raw_reports_parse_errors() {
    // Without the prevout the sender cannot be resolved; the error is printed
    let (raw, _) = class_c_transaction();
    run(&["omni-codec", "decode-raw", &raw, "--height", "400000"]).unwrap();
}

#[test]
fn test_decode_raw_rejects_invalid_input() {
    assert!(run(&["omni-codec", "decode-raw", "zz", "--height", "1"]).is_err());

    let (raw, _) = class_c_transaction();
    assert!(run(&[
        "omni-codec",
        "decode-raw",
        &raw,
        "--height",
        "1",
        "--prevout",
        "not-a-prevout",
    ])
    .is_err());
}

#[test]
fn test_encode_class_c() {
    run(&[
        "omni-codec",
        "encode",
        "class-c",
        "--payload",
        "00000000000000010000000000000064",
    ])
    .unwrap();
}

#[test]
fn test_encode_rejects_oversized_class_a() {
    let receiver = Destination::PubkeyHash([0x01; 20])
        .to_address(&ProtocolParams::bitcoin().address_versions);
    let payload = "00".repeat(20);
    assert!(run(&[
        "omni-codec",
        "encode",
        "class-a",
        "--receiver",
        &receiver,
        "--payload",
        &payload,
    ])
    .is_err());
}

#[test]
fn test_show_config_from_file() {
    let file = config_file("[network]\npreset = \"regtest\"\n\n[processing]\nthreads = 2\n");
    let path = file.path().to_string_lossy().to_string();
    run(&["omni-codec", "show-config", "--config", &path]).unwrap();
}

#[test]
fn test_show_config_rejects_unknown_preset() {
    let file = config_file("[network]\npreset = \"dogecoin\"\n");
    let path = file.path().to_string_lossy().to_string();
    assert!(run(&["omni-codec", "show-config", "--config", &path]).is_err());

    let missing = file.path().with_extension("missing.toml");
    let missing = missing.to_string_lossy().to_string();
    assert!(run(&["omni-codec", "show-config", "--config", &missing]).is_err());
}
