//! Standard outputs used across the test vectors

use super::{create_tx_out, TEST_EXODUS_ADDRESS};
use bitcoin::opcodes::all::{OP_CHECKMULTISIG, OP_CHECKSIG, OP_RETURN};
use bitcoin::opcodes::OP_TRUE;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::{Amount, TxOut};
use omni_codec::script::Destination;

/// Redeeming key of the MaidSafeCoin crowdsale
pub const MAIDSAFE_PUBKEY: &str =
    "023a3891f00650b2971ec94383bc6949b672a498baa19b6e3421ccde196ccc64d6";

/// The secp256k1 generator point, compressed
pub const GENERATOR_PUBKEY: &str =
    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

/// Class C simple send of 115,000,000 units of property 7, marker included
pub const SIMPLE_SEND_PUSH: &str = "6f6d6e6900000000000000070000000006dac2c0";

pub const UNRELATED_PUBKEY_HASH_ADDRESS: &str = "C2uS5SDveHLU4oecepg8XJuizD3pMDs2m5";

fn push(bytes: Vec<u8>) -> PushBytesBuf {
    PushBytesBuf::try_from(bytes).unwrap()
}

/// Null-data output with the given hex pushes
pub fn null_data(value: u64, pushes: &[&str]) -> TxOut {
    let mut builder = Builder::new().push_opcode(OP_RETURN);
    for data in pushes {
        builder = builder.push_slice(push(hex::decode(data).unwrap()));
    }
    TxOut {
        value: Amount::from_sat(value),
        script_pubkey: builder.into_script(),
    }
}

pub fn non_standard_output() -> TxOut {
    TxOut {
        value: Amount::from_sat(6000),
        script_pubkey: Builder::new().push_opcode(OP_TRUE).into_script(),
    }
}

pub fn pay_to_pubkey_unrelated() -> TxOut {
    TxOut {
        value: Amount::from_sat(6000),
        script_pubkey: Builder::new()
            .push_slice(push(hex::decode(GENERATOR_PUBKEY).unwrap()))
            .push_opcode(OP_CHECKSIG)
            .into_script(),
    }
}

pub fn pay_to_pubkey_hash_exodus() -> TxOut {
    create_tx_out(6000, TEST_EXODUS_ADDRESS)
}

pub fn pay_to_pubkey_hash_unrelated() -> TxOut {
    create_tx_out(6000, UNRELATED_PUBKEY_HASH_ADDRESS)
}

pub fn pay_to_script_hash_unrelated() -> TxOut {
    TxOut {
        value: Amount::from_sat(6000),
        script_pubkey: Destination::ScriptHash([0x5a; 20]).script_pubkey(),
    }
}

/// Bare multisig with `total` keys, the first one being the MaidSafe key
pub fn pay_to_bare_multisig(required: i64, total: u8) -> TxOut {
    let mut builder = Builder::new()
        .push_int(required)
        .push_slice(push(hex::decode(MAIDSAFE_PUBKEY).unwrap()));
    for index in 1..total {
        let mut key = vec![0x03];
        key.extend_from_slice(&[index; 32]);
        builder = builder.push_slice(push(key));
    }
    TxOut {
        value: Amount::from_sat(6000),
        script_pubkey: builder
            .push_int(i64::from(total))
            .push_opcode(OP_CHECKMULTISIG)
            .into_script(),
    }
}

pub fn pay_to_bare_multisig_1of3() -> TxOut {
    pay_to_bare_multisig(1, 3)
}

pub fn pay_to_bare_multisig_3of5() -> TxOut {
    pay_to_bare_multisig(3, 5)
}

pub fn op_return_simple_send() -> TxOut {
    null_data(0, &[SIMPLE_SEND_PUSH])
}

pub fn op_return_plain_marker() -> TxOut {
    null_data(0, &["6f6d6e69"])
}

/// Untagged null data ("Mulholland Drive")
pub fn op_return_unrelated() -> TxOut {
    null_data(0, &["4d756c686f6c6c616e64204472697665"])
}

/// Send-to-many style payload spread over several pushes of one output
pub const MULTI_SIMPLE_SEND_PUSHES: [&str; 4] = [
    "6f6d6e6900000000000000070000000000002329",
    "0062e907b15cbf27d5425399ebf6f0fb50ebb88f18",
    "000000000000001f0000000001406f40",
    "05da59767e81f4b019fe9f5984dbaa4f61bf197967",
];

pub fn op_return_multi_simple_send() -> TxOut {
    null_data(0, &MULTI_SIMPLE_SEND_PUSHES)
}
