//! Encode/Parse Round Trips
//!
//! Outputs laid out by the encoder, spent from a resolved coin and placed next to
//! change and receiver outputs, must parse back to the same payload, sender and
//! receiver.

use crate::common::build_transaction;
use crate::common::fixtures::MAIDSAFE_PUBKEY;
use bitcoin::{Amount, TxOut};
use omni_codec::script::Destination;
use omni_codec::{encode, parse, EncodeRequest, EncodingClass, ParsedMessage, ProtocolParams};

/// Simple send of 1 TMSC
const SIMPLE_SEND_TMSC: &str = "00000000000000020000000005f5e100";

fn pay(value: u64, destination: Destination) -> TxOut {
    TxOut {
        value: Amount::from_sat(value),
        script_pubkey: destination.script_pubkey(),
    }
}

fn address(destination: Destination, params: &ProtocolParams) -> String {
    destination.to_address(&params.address_versions)
}

fn parse_message(
    inputs: &[TxOut],
    outputs: Vec<TxOut>,
    height: u32,
    params: &ProtocolParams,
) -> ParsedMessage {
    let (tx, coins) = build_transaction(inputs, outputs);
    parse(&tx, height, 1_500_000_000, &coins, params)
        .unwrap()
        .into_message()
        .unwrap()
}

#[test]
fn test_class_a_round_trip() {
    let params = ProtocolParams::bitcoin();
    let sender = Destination::PubkeyHash([0x11; 20]);
    let receiver = Destination::PubkeyHash([0x42; 20]);
    let payload = hex::decode(SIMPLE_SEND_TMSC).unwrap();

    let mut outputs = encode(
        &EncodeRequest::ClassA {
            receiver: address(receiver, &params),
            payload: payload.clone(),
        },
        &params,
    )
    .unwrap();
    assert_eq!(outputs.len(), 3);
    outputs.push(pay(50_000, sender));

    let message = parse_message(&[pay(100_000, sender)], outputs, 300_000, &params);
    assert_eq!(message.encoding_class, EncodingClass::A);
    assert_eq!(message.sender, address(sender, &params));
    assert_eq!(message.receiver, Some(address(receiver, &params)));
    assert_eq!(message.fee, 100_000 - 3 * params.dust_value as i64 - 50_000);
    assert_eq!(message.block_time, 1_500_000_000);

    // The data hash holds 19 bytes; the rest of it is zero
    assert_eq!(message.payload.len(), 19);
    assert_eq!(&message.payload[..payload.len()], payload.as_slice());
    assert!(message.payload[payload.len()..].iter().all(|byte| *byte == 0));
}

#[test]
fn test_class_a_receiver_hash_wraps() {
    let params = ProtocolParams::bitcoin();
    let sender = Destination::PubkeyHash([0x11; 20]);
    let mut receiver_hash = [0x42; 20];
    receiver_hash[0] = 0x00;
    let receiver = Destination::PubkeyHash(receiver_hash);

    let outputs = encode(
        &EncodeRequest::ClassA {
            receiver: address(receiver, &params),
            payload: hex::decode(SIMPLE_SEND_TMSC).unwrap(),
        },
        &params,
    )
    .unwrap();

    let message = parse_message(&[pay(100_000, sender)], outputs, 300_000, &params);
    assert_eq!(message.receiver, Some(address(receiver, &params)));
}

#[test]
fn test_class_b_round_trip() {
    let params = ProtocolParams::bitcoin();
    let sender = Destination::PubkeyHash([0x22; 20]);
    let receiver = Destination::ScriptHash([0x33; 20]);
    let payload = hex::decode(SIMPLE_SEND_TMSC).unwrap();

    let mut outputs = vec![pay(params.dust_value, receiver)];
    outputs.extend(
        encode(
            &EncodeRequest::ClassB {
                sender: address(sender, &params),
                redeeming_pubkey: hex::decode(MAIDSAFE_PUBKEY).unwrap(),
                payload: payload.clone(),
            },
            &params,
        )
        .unwrap(),
    );
    outputs.push(pay(20_000, sender));

    let inputs = [pay(40_000, sender), pay(10_000, Destination::PubkeyHash([0x99; 20]))];
    let message = parse_message(&inputs, outputs, 330_000, &params);
    assert_eq!(message.encoding_class, EncodingClass::B);
    assert_eq!(message.sender, address(sender, &params));
    assert_eq!(message.receiver, Some(address(receiver, &params)));

    // One packet of 30 payload bytes
    assert_eq!(message.payload.len(), 30);
    assert_eq!(&message.payload[..payload.len()], payload.as_slice());
}

#[test]
fn test_class_c_round_trip() {
    let params = ProtocolParams::bitcoin();
    let sender = Destination::ScriptHash([0x44; 20]);
    let receiver = Destination::PubkeyHash([0x55; 20]);
    let payload: Vec<u8> = (0u8..=199).collect();

    let outputs = encode(
        &EncodeRequest::ClassC {
            receiver: Some(address(receiver, &params)),
            payload: payload.clone(),
        },
        &params,
    )
    .unwrap();
    assert_eq!(outputs.len(), 2);

    let message = parse_message(&[pay(30_000, sender)], outputs, 400_000, &params);
    assert_eq!(message.encoding_class, EncodingClass::C);
    assert_eq!(message.sender, address(sender, &params));
    assert_eq!(message.receiver, Some(address(receiver, &params)));
    assert_eq!(message.payload, payload);
    assert_eq!(message.fee, 30_000 - params.dust_value as i64);
}

#[test]
fn test_class_c_round_trip_across_outputs() {
    let mut params = ProtocolParams::bitcoin();
    params.max_push_size = 40;
    let sender = Destination::PubkeyHash([0x66; 20]);
    let payload: Vec<u8> = (0u8..100).collect();

    let outputs = encode(
        &EncodeRequest::ClassC {
            receiver: None,
            payload: payload.clone(),
        },
        &params,
    )
    .unwrap();
    assert_eq!(outputs.len(), 3);

    let message = parse_message(&[pay(30_000, sender)], outputs, 400_000, &params);
    assert_eq!(message.payload, payload);
    assert!(message.receiver.is_none());
}

#[test]
fn test_regtest_round_trip_from_genesis() {
    let params = ProtocolParams::regtest();
    let sender = Destination::PubkeyHash([0x77; 20]);
    let sender_address = address(sender, &params);
    assert!(sender_address.starts_with('m') || sender_address.starts_with('n'));

    let outputs = encode(
        &EncodeRequest::ClassC {
            receiver: Some(sender_address.clone()),
            payload: hex::decode(SIMPLE_SEND_TMSC).unwrap(),
        },
        &params,
    )
    .unwrap();

    let message = parse_message(&[pay(30_000, sender)], outputs, 0, &params);
    assert_eq!(message.sender, sender_address);
    assert_eq!(message.receiver, Some(sender_address));
    assert_eq!(message.payload_hex(), SIMPLE_SEND_TMSC);
}
