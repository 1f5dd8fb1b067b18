//! Class B Encoding Tests
//!
//! Packets are laid out two per 1-of-3 multisig output (the last output may hold
//! one), each obfuscated with the keystream derived from the sender address, and the
//! Exodus output closes the list.

use crate::common::{build_transaction, create_tx_out, test_params, TEST_EXODUS_ADDRESS};
use bitcoin::{Amount, TxOut};
use omni_codec::encoding::class_b;
use omni_codec::script::{address_of, classify, script_for_address, ScriptClass};
use omni_codec::{parse, EncodingClass, ProtocolParams};

/// Property creation of Tether US, mainnet transaction
/// 5ed3694e8a4fa8d3ec5c75eb6789492c69e65511522b220e94ab51da2b6dd53f
const TETHER_SEED: &str = "3MbYQMMmSkC3AgWkj9FMo5LsPTW1zBTwXL";
const TETHER_PUBKEY: &str = concat!(
    "04ad90e5b6bc86b3ec7fac2c5fbda7423fc8ef0d58df594c773fa05e2c281b2bfe",
    "877677c668bd13603944e34f4818ee03cadd81a88542b8b4d5431264180e2c28"
);
const TETHER_PAYLOAD: &str = concat!(
    "000000360100020000000046696e616e6369616c20616e6420696e737572",
    "616e63652061637469766974696573004163746976697469657320617578",
    "696c6961727920746f2066696e616e6369616c207365727669636520616e",
    "6420696e737572616e636520616374697669746965730054657468657255",
    "530068747470733a2f2f7465746865722e746f00546865206e6578742070",
    "6172616469676d206f66206d6f6e65792e00"
);

fn multisig_keys(output: &TxOut) -> Vec<Vec<u8>> {
    match classify(&output.script_pubkey) {
        ScriptClass::BareMultisig { required, pubkeys } => {
            assert_eq!(required, 1);
            pubkeys
        }
        other => panic!("expected bare multisig, got {:?}", other),
    }
}

#[test]
fn test_empty_payload_pays_exodus_only() {
    let params = test_params();
    let outputs = class_b::encode("", &[], &[], &params).unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(
        address_of(&outputs[0].script_pubkey, &params).as_deref(),
        Some(TEST_EXODUS_ADDRESS)
    );
}

#[test]
fn test_tether_property_creation() {
    let params = ProtocolParams::bitcoin();
    let pubkey = hex::decode(TETHER_PUBKEY).unwrap();
    let payload = hex::decode(TETHER_PAYLOAD).unwrap();

    let outputs = class_b::encode(TETHER_SEED, &pubkey, &payload, &params).unwrap();
    assert_eq!(outputs.len(), 4);
    assert!(outputs[3].script_pubkey.is_p2pkh());

    let expected = [
        [
            "f88f01791557f6d57e6b7ddf86d2de2117e6cc4ba325a4e309d4a1a55015d7",
            "a94f47f4c3b8c36876399f19ecd61cf452248330fa5da9a1947d6dc7a189a1",
        ],
        [
            "6d7e7235fc2c6769e351196c9ccdc4c804184b5bb9b210f27d3f0a613654fe",
            "8991cff7cc6d93c266615d2a9223cef4d7b11c05c16b0cec12a90ee7b39cf8",
        ],
        [
            "29b3e0919adc41a316aad4f41444d9bf3a9b639550f2aa735676ffff25ba38",
            "f15446771c5c585dd25d8d62df5195b77799aa8eac2f2196c54b73ca05f72f",
        ],
    ];
    for (output, packets) in outputs.iter().zip(expected) {
        let keys = multisig_keys(output);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], pubkey);
        // Prefix byte and trailing fix byte are not part of the packet
        assert_eq!(hex::encode(&keys[1][1..32]), packets[0]);
        assert_eq!(hex::encode(&keys[2][1..32]), packets[1]);
    }
}

#[test]
fn test_tether_parses_back() {
    let params = ProtocolParams::bitcoin();
    let pubkey = hex::decode(TETHER_PUBKEY).unwrap();
    let payload = hex::decode(TETHER_PAYLOAD).unwrap();
    let outputs = class_b::encode(TETHER_SEED, &pubkey, &payload, &params).unwrap();

    let issuer = TxOut {
        value: Amount::from_sat(100_000),
        script_pubkey: script_for_address(TETHER_SEED, &params).unwrap(),
    };
    let (tx, coins) = build_transaction(&[issuer], outputs);

    let message = parse(&tx, 324_140, 1_412_000_000, &coins, &params)
        .unwrap()
        .into_message()
        .unwrap();
    assert_eq!(message.encoding_class, EncodingClass::B);
    assert_eq!(message.sender, TETHER_SEED);
    assert!(message.receiver.is_none());

    // Six packets of 30 bytes, zero-filled after the payload
    assert_eq!(message.payload.len(), 180);
    assert_eq!(&message.payload[..payload.len()], payload.as_slice());
    assert!(message.payload[payload.len()..].iter().all(|byte| *byte == 0));

    let header = message.header().unwrap();
    assert_eq!(header.version, 0);
    assert_eq!(header.message_type, 54);
}

#[test]
fn test_packets_of_another_sender_do_not_decode() {
    let params = test_params();
    let pubkey = hex::decode(TETHER_PUBKEY).unwrap();
    let payload = hex::decode(TETHER_PAYLOAD).unwrap();
    let outputs = class_b::encode(TETHER_SEED, &pubkey, &payload, &params).unwrap();

    let sender = "C3mPrmQeD2wyZUea2PgSyndwJei4yvABgj";
    let (tx, coins) = build_transaction(&[create_tx_out(100_000, sender)], outputs);

    let message = parse(&tx, u32::MAX, 0, &coins, &params)
        .unwrap()
        .into_message()
        .unwrap();
    assert_eq!(message.sender, sender);
    assert_ne!(&message.payload[..payload.len()], payload.as_slice());
}
