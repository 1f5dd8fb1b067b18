use crate::types::ActivationRules;
use bitcoin::opcodes::all::{OP_CHECKMULTISIG, OP_CHECKSIG, OP_PUSHNUM_1, OP_PUSHNUM_16, OP_RETURN};
use bitcoin::opcodes::Opcode;
use bitcoin::script::{Instruction, Script};
use serde::{Deserialize, Serialize};

/// Standard type of a script, with the data each type carries
///
/// Classification never fails: anything that does not match one of the templates
/// below exactly is `NonStandard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptClass {
    /// OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
    PubkeyHash([u8; 20]),
    /// OP_HASH160 <20> OP_EQUAL
    ScriptHash([u8; 20]),
    /// <pubkey> OP_CHECKSIG
    Pubkey(Vec<u8>),
    /// OP_m <pubkey>... OP_n OP_CHECKMULTISIG
    BareMultisig {
        required: u8,
        pubkeys: Vec<Vec<u8>>,
    },
    /// OP_RETURN followed by push-only operations
    NullData { pushes: Vec<Vec<u8>> },
    NonStandard,
}

impl ScriptClass {
    /// Short name for display
    pub fn name(&self) -> &'static str {
        match self {
            ScriptClass::PubkeyHash(_) => "pubkeyhash",
            ScriptClass::ScriptHash(_) => "scripthash",
            ScriptClass::Pubkey(_) => "pubkey",
            ScriptClass::BareMultisig { .. } => "multisig",
            ScriptClass::NullData { .. } => "nulldata",
            ScriptClass::NonStandard => "nonstandard",
        }
    }

    /// Pay-to-pubkey-hash or pay-to-script-hash
    pub fn is_single_address(&self) -> bool {
        matches!(self, ScriptClass::PubkeyHash(_) | ScriptClass::ScriptHash(_))
    }

    /// Whether the protocol recognises this output type at `height`
    ///
    /// Pay-to-pubkey-hash is always allowed, the other recognised types from their
    /// activation height onwards. Pay-to-pubkey and non-standard scripts never are.
    pub fn is_allowed(&self, height: u32, rules: &ActivationRules) -> bool {
        match self {
            ScriptClass::PubkeyHash(_) => true,
            ScriptClass::ScriptHash(_) => rules.script_hash_active(height),
            ScriptClass::BareMultisig { .. } => rules.multisig_active(height),
            ScriptClass::NullData { .. } => rules.null_data_active(height),
            ScriptClass::Pubkey(_) | ScriptClass::NonStandard => false,
        }
    }
}

/// Classify a script
pub fn classify(script: &Script) -> ScriptClass {
    let bytes = script.as_bytes();

    if script.is_p2pkh() {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[3..23]);
        return ScriptClass::PubkeyHash(hash);
    }
    if script.is_p2sh() {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[2..22]);
        return ScriptClass::ScriptHash(hash);
    }
    if bytes.first() == Some(&OP_RETURN.to_u8()) {
        return match null_data_pushes(Script::from_bytes(&bytes[1..])) {
            Some(pushes) => ScriptClass::NullData { pushes },
            None => ScriptClass::NonStandard,
        };
    }

    let instructions: Option<Vec<Instruction>> =
        script.instructions().map(|instruction| instruction.ok()).collect();
    let Some(instructions) = instructions else {
        return ScriptClass::NonStandard;
    };

    if let Some(pubkey) = match_pubkey(&instructions) {
        return ScriptClass::Pubkey(pubkey);
    }
    if let Some((required, pubkeys)) = match_multisig(&instructions) {
        return ScriptClass::BareMultisig { required, pubkeys };
    }

    ScriptClass::NonStandard
}

/// Header byte and length check of a serialised public key
///
/// Only the shape is checked, not whether the point is on the curve.
pub fn is_valid_pubkey_size(key: &[u8]) -> bool {
    match key.first() {
        Some(0x02) | Some(0x03) => key.len() == 33,
        Some(0x04) | Some(0x06) | Some(0x07) => key.len() == 65,
        _ => false,
    }
}

/// Data pushes of the script after OP_RETURN, or `None` if it is not push-only
///
/// OP_0 counts as an empty push; OP_1NEGATE..OP_16 are allowed but carry no data.
fn null_data_pushes(rest: &Script) -> Option<Vec<Vec<u8>>> {
    let mut pushes = Vec::new();
    for instruction in rest.instructions() {
        match instruction.ok()? {
            Instruction::PushBytes(data) => pushes.push(data.as_bytes().to_vec()),
            Instruction::Op(op) if op.to_u8() <= OP_PUSHNUM_16.to_u8() => {}
            Instruction::Op(_) => return None,
        }
    }
    Some(pushes)
}

fn match_pubkey(instructions: &[Instruction]) -> Option<Vec<u8>> {
    match instructions {
        [Instruction::PushBytes(key), Instruction::Op(op)]
            if *op == OP_CHECKSIG && is_valid_pubkey_size(key.as_bytes()) =>
        {
            Some(key.as_bytes().to_vec())
        }
        _ => None,
    }
}

fn match_multisig(instructions: &[Instruction]) -> Option<(u8, Vec<Vec<u8>>)> {
    let (first, rest) = instructions.split_first()?;
    let (last, rest) = rest.split_last()?;
    let (total, keys) = rest.split_last()?;

    match last {
        Instruction::Op(op) if *op == OP_CHECKMULTISIG => {}
        _ => return None,
    }
    let required = small_int(first)?;
    let total = small_int(total)?;

    let mut pubkeys = Vec::with_capacity(keys.len());
    for key in keys {
        match key {
            Instruction::PushBytes(data) if is_valid_pubkey_size(data.as_bytes()) => {
                pubkeys.push(data.as_bytes().to_vec())
            }
            _ => return None,
        }
    }

    if required == 0 || required > total || usize::from(total) != pubkeys.len() {
        return None;
    }
    Some((required, pubkeys))
}

/// OP_1..OP_16 as a number
fn small_int(instruction: &Instruction) -> Option<u8> {
    match instruction {
        Instruction::Op(op) => opcode_small_int(*op),
        _ => None,
    }
}

fn opcode_small_int(op: Opcode) -> Option<u8> {
    let value = op.to_u8();
    let first = OP_PUSHNUM_1.to_u8();
    if (first..=OP_PUSHNUM_16.to_u8()).contains(&value) {
        Some(value - first + 1)
    } else {
        None
    }
}
