//! Class A Parsing Tests
//!
//! Simple sends hidden in the destination hash of a pay-to-address output. The data
//! output is the one whose hash carries version 0, type 0 and property 1 or 2; the
//! receiver is found by sequence number, or by value when the sequence is ambiguous.

use crate::common::fixtures::{
    non_standard_output, op_return_unrelated, pay_to_pubkey_unrelated,
};
use crate::common::{create_tx_out, parse_message, parse_with_test_params, script_hash_height};
use omni_codec::{EncodingClass, ParseError};

const EXODUS: &str = "CEXodUs3feFVbq2zfvBimFdpS4evGZq15c";
const SENDER: &str = "C9ajxeK8qzjbzZQxkTFWKw8vycfChdi6xi";
const RECEIVER: &str = "C4kYHmwRhj5ZgJdC2RYWKyujKfovZudFXJ";

/// Data address of a simple send of 100 MSC
const DATA_MSC: &str = "C4cWj6wnh7GhSTKJJVh5JtBkvCFKdEsdUm";
const PAYLOAD_MSC: &str = "000000000000000100000002540be400000000";

#[test]
fn test_reference_by_sequence() {
    let inputs = vec![
        create_tx_out(1_765_000, SENDER),
        create_tx_out(50_000, "Bv7iwfpnoTTDY7tA3xj6wQmrmdQJAT35V5"),
    ];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, DATA_MSC),
        create_tx_out(6000, RECEIVER),
        create_tx_out(1_747_000, SENDER),
    ];

    let message = parse_message(&inputs, outputs, 0);
    assert_eq!(message.encoding_class, EncodingClass::A);
    assert_eq!(message.fee, 50_000);
    assert_eq!(message.sender, SENDER);
    assert_eq!(message.receiver.as_deref(), Some(RECEIVER));
    assert_eq!(message.payload_hex(), PAYLOAD_MSC);
}

#[test]
fn test_test_mastercoin_with_exodus_last() {
    let inputs = vec![create_tx_out(907_500, SENDER), create_tx_out(907_500, SENDER)];
    let outputs = vec![
        create_tx_out(6000, "C4cWj6wnh7GhSaUhZfbxRFKnW9F7Zvf7v2"),
        create_tx_out(6000, RECEIVER),
        create_tx_out(1_747_000, SENDER),
        create_tx_out(6000, EXODUS),
    ];

    let message = parse_message(&inputs, outputs, 0);
    assert_eq!(message.fee, 50_000);
    assert_eq!(message.sender, SENDER);
    assert_eq!(message.receiver.as_deref(), Some(RECEIVER));
    assert_eq!(message.payload_hex(), "000000000000000200000002540be400000000");
}

#[test]
fn test_unrelated_outputs_are_ignored() {
    let inputs = vec![create_tx_out(1_815_000, SENDER)];
    let outputs = vec![
        non_standard_output(),
        non_standard_output(),
        non_standard_output(),
        non_standard_output(),
        non_standard_output(),
        create_tx_out(6000, EXODUS),
        pay_to_pubkey_unrelated(),
        pay_to_pubkey_unrelated(),
        pay_to_pubkey_unrelated(),
        create_tx_out(6000, RECEIVER),
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, EXODUS),
        op_return_unrelated(),
        op_return_unrelated(),
        create_tx_out(6000, DATA_MSC),
        create_tx_out(1_747_000, SENDER),
    ];

    let message = parse_message(&inputs, outputs, u32::MAX);
    assert_eq!(message.sender, SENDER);
    assert_eq!(message.receiver.as_deref(), Some(RECEIVER));
    assert_eq!(message.payload_hex(), PAYLOAD_MSC);
}

#[test]
fn test_sender_can_be_receiver() {
    // The second output uses an unknown version byte and is not a candidate
    let inputs = vec![create_tx_out(87_000, SENDER)];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, "C9SkYGdcnTnjMKc9pvSVkeHX2ctB2BLbnc"),
        create_tx_out(6000, "6uxd4fdZ8wXeCPXaxxDohSn1afeTYEaxVc"),
        create_tx_out(7000, RECEIVER),
        create_tx_out(7000, SENDER),
    ];

    let message = parse_message(&inputs, outputs, 0);
    assert_eq!(message.fee, 55_000);
    assert_eq!(message.sender, SENDER);
    assert_eq!(message.receiver.as_deref(), Some(SENDER));
    assert_eq!(message.payload_hex(), PAYLOAD_MSC);
}

#[test]
fn test_sequence_collision_falls_back_to_value() {
    let inputs = vec![
        create_tx_out(100_000, "UgaWSroMxX2Ub64sxAnFEHFXxBMrrFmeWx"),
        create_tx_out(100_000, "UgaWSroMxX2Ub64sxAnFEHFXxBMrrFmeWx"),
        create_tx_out(200_000, SENDER),
        create_tx_out(100_000, "UgaWSroMxX2Ub64sxAnFEHFXxBMrrFmeWx"),
        create_tx_out(200_000, SENDER),
    ];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, "C9SkYGdcnTnjMKc9pvSVkeHX2ctB2BLbnc"),
        create_tx_out(6000, "C9Y3DTkwCe2Rt7XCR7yZwfoudoknuohosM"),
        create_tx_out(6001, RECEIVER),
        create_tx_out(665_999, SENDER),
    ];

    let message = parse_message(&inputs, outputs, script_hash_height());
    assert_eq!(message.fee, 10_000);
    assert_eq!(message.sender, SENDER);
    assert_eq!(
        message.receiver.as_deref(),
        Some("C9Y3DTkwCe2Rt7XCR7yZwfoudoknuohosM")
    );
    assert_eq!(message.payload_hex(), PAYLOAD_MSC);
}

#[test]
fn test_data_output_paying_the_sender() {
    let sender = "BsmJKGw167AYme4SPW2pzb1G7VV5s3p4o2";
    let inputs = vec![create_tx_out(70_000, sender)];
    let outputs = vec![
        create_tx_out(9001, EXODUS),
        create_tx_out(9001, sender),
        create_tx_out(9001, "BsmJKGw167AYnP2qxXW7emqRdBTqYC9xLK"),
    ];

    let message = parse_message(&inputs, outputs, 0);
    assert_eq!(message.sender, sender);
    assert_eq!(
        message.receiver.as_deref(),
        Some("BsmJKGw167AYnP2qxXW7emqRdBTqYC9xLK")
    );
    assert_eq!(message.payload_hex(), "00000000000000010000000777777700000000");
}

#[test]
fn test_script_hash_outputs() {
    let inputs = vec![create_tx_out(1_815_000, "Ug7egduWEAjzURB6v24L2p1hFXYJKRtNVK")];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6001, "UQMVXNYr7rekJt9zvA33EemXhipJ4VUQR1"),
        create_tx_out(6002, "UQVxFqU49ez9gQTQA3UGD6CVrLuMpuaX8P"),
        create_tx_out(6003, "UeQF4rR7eeiiMmf6cHj4z1g9dHYDc317Si"),
    ];

    let message = parse_message(&inputs, outputs, script_hash_height());
    assert_eq!(message.sender, "Ug7egduWEAjzURB6v24L2p1hFXYJKRtNVK");
    assert_eq!(
        message.receiver.as_deref(),
        Some("UQVxFqU49ez9gQTQA3UGD6CVrLuMpuaX8P")
    );
    assert_eq!(message.payload_hex(), "000000000000000200000002540be400000000");
}

#[test]
fn test_script_hash_sender_before_activation() {
    let inputs = vec![create_tx_out(1_815_000, "Ug7egduWEAjzURB6v24L2p1hFXYJKRtNVK")];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, DATA_MSC),
        create_tx_out(6000, RECEIVER),
    ];

    let result = parse_with_test_params(&inputs, outputs, script_hash_height() - 1);
    assert!(matches!(result, Err(ParseError::UnresolvableSender(_))));
}

#[test]
fn test_more_than_one_data_output() {
    let inputs = vec![create_tx_out(1_815_000, SENDER)];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, RECEIVER),
        create_tx_out(6000, DATA_MSC),
        create_tx_out(6000, DATA_MSC),
        create_tx_out(1_747_000, SENDER),
    ];

    let result = parse_with_test_params(&inputs, outputs, 0);
    assert!(matches!(result, Err(ParseError::MalformedPayload(_))));
}

#[test]
fn test_property_other_than_msc_or_tmsc() {
    let inputs = vec![create_tx_out(1_815_000, SENDER)];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, "C5wJzTrjQwYAsDk8yPtfng5DBr7LRo3udr"),
        create_tx_out(6000, RECEIVER),
        create_tx_out(1_747_000, SENDER),
    ];

    let result = parse_with_test_params(&inputs, outputs, 0);
    assert!(matches!(result, Err(ParseError::MalformedPayload(_))));
}

#[test]
fn test_ambiguous_reference() {
    // Two outputs follow the data sequence and two share its value
    let inputs = vec![create_tx_out(1_815_000, SENDER)];
    let outputs = vec![
        create_tx_out(6000, EXODUS),
        create_tx_out(6000, "C9SkYGdcnTnjMKc9pvSVkeHX2ctB2BLbnc"),
        create_tx_out(6000, "C9Y3DTkwCe2Rt7XCR7yZwfoudoknuohosM"),
        create_tx_out(6000, RECEIVER),
        create_tx_out(1_747_000, SENDER),
    ];

    let result = parse_with_test_params(&inputs, outputs, 0);
    assert!(matches!(result, Err(ParseError::MalformedPayload(_))));
}
