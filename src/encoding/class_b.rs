//! Class B: obfuscated packets in bare multisig outputs
//!
//! Every allowed bare multisig output holds the sender's real (redeeming) key first,
//! followed by one or two fake keys. Bytes `[1..=PACKET_SIZE]` of each fake key are
//! one packet, XORed with the keystream hash of its position in the transaction.
//! The first byte of a clear packet is its sequence number and is not payload.

use crate::crypto::{apply_keystream, ObfuscationHashes};
use crate::errors::{EncodeError, EncodeResult, ParseError, ParseResult};
use crate::script::{classify, exodus_destination, ScriptClass};
use crate::types::ProtocolParams;
use bitcoin::opcodes::all::OP_CHECKMULTISIG;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::secp256k1::PublicKey;
use bitcoin::{Amount, TxOut};
use serde::Serialize;
use tracing::debug;

/// Length of a compressed public key
const COMPRESSED_KEY_SIZE: usize = 33;

/// Fake keys per multisig output, besides the redeeming key
const PACKETS_PER_OUTPUT: usize = 2;

/// One packet recovered from a multisig output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassBPacket {
    pub vout: usize,
    /// Key position inside the multisig script (1 for the first fake key)
    pub position: usize,
    /// Position of the packet across the transaction, starting at 1
    pub sequence: usize,
    #[serde(with = "hex::serde")]
    pub obfuscated: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub clear: Vec<u8>,
}

impl ClassBPacket {
    /// Sequence byte embedded in the clear packet
    pub fn embedded_sequence(&self) -> Option<u8> {
        self.clear.first().copied()
    }

    /// Payload bytes of the packet
    pub fn data(&self) -> &[u8] {
        self.clear.get(1..).unwrap_or(&[])
    }
}

/// Read and deobfuscate every packet, at most `max_packets`
pub fn packets(
    outputs: &[TxOut],
    seed: &str,
    height: u32,
    params: &ProtocolParams,
) -> ParseResult<Vec<ClassBPacket>> {
    let mut packets = Vec::new();

    'outputs: for (vout, output) in outputs.iter().enumerate() {
        let class = classify(&output.script_pubkey);
        if !class.is_allowed(height, &params.activation) {
            continue;
        }
        let ScriptClass::BareMultisig { pubkeys, .. } = class else {
            continue;
        };

        for (position, key) in pubkeys.iter().enumerate().skip(1) {
            if packets.len() >= params.max_packets {
                debug!("Packet limit {} reached at vout {}", params.max_packets, vout);
                break 'outputs;
            }
            let chunk = key.get(1..=params.packet_size).ok_or_else(|| {
                ParseError::MalformedPayload(format!(
                    "key of {} bytes at vout {} cannot hold a {}-byte packet",
                    key.len(),
                    vout,
                    params.packet_size
                ))
            })?;
            packets.push(ClassBPacket {
                vout,
                position,
                sequence: packets.len() + 1,
                obfuscated: chunk.to_vec(),
                clear: chunk.to_vec(),
            });
        }
    }

    let hashes = ObfuscationHashes::new(seed, packets.len());
    for packet in packets.iter_mut() {
        if let Some(hash) = hashes.get(packet.sequence) {
            apply_keystream(&mut packet.clear, hash);
        }
        if packet.embedded_sequence() != Some(packet.sequence as u8) {
            debug!(
                "Packet {} at vout {} carries sequence byte {:?}",
                packet.sequence,
                packet.vout,
                packet.embedded_sequence()
            );
        }
    }

    Ok(packets)
}

/// Extract the Class B payload, deobfuscating with the sender address as seed
pub fn decode(
    outputs: &[TxOut],
    seed: &str,
    height: u32,
    params: &ProtocolParams,
) -> ParseResult<Vec<u8>> {
    let packets = packets(outputs, seed, height, params)?;

    let mut payload: Vec<u8> = packets
        .iter()
        .flat_map(|packet| packet.data().iter().copied())
        .collect();

    let max = params.max_payload_size();
    if payload.len() > max {
        payload.truncate(max);
    }
    debug!(
        "Decoded {} Class B packets into {} bytes",
        packets.len(),
        payload.len()
    );
    Ok(payload)
}

/// Lay out the payload as multisig outputs followed by the Exodus output
///
/// Each multisig output is 1-of-N with the redeeming key first and up to two
/// obfuscated packet keys. An empty payload produces only the Exodus output.
pub fn encode(
    seed: &str,
    redeeming_pubkey: &[u8],
    payload: &[u8],
    params: &ProtocolParams,
) -> EncodeResult<Vec<TxOut>> {
    let exodus = exodus_destination(params)
        .ok_or_else(|| EncodeError::InvalidAddress(params.exodus_address.clone()))?;
    let exodus_output = TxOut {
        value: Amount::from_sat(params.dust_value),
        script_pubkey: exodus.script_pubkey(),
    };

    if payload.is_empty() {
        return Ok(vec![exodus_output]);
    }

    if params.packet_size < 2 || params.packet_size > COMPRESSED_KEY_SIZE - 2 {
        return Err(EncodeError::PayloadTooLarge {
            size: params.packet_size,
            max: COMPRESSED_KEY_SIZE - 2,
        });
    }
    let chunk_size = params.packet_size - 1;
    let max = params.max_packets * chunk_size;
    if payload.len() > max {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }

    PublicKey::from_slice(redeeming_pubkey)
        .map_err(|e| EncodeError::InvalidPubkey(format!("{}: {}", hex::encode(redeeming_pubkey), e)))?;
    let redeeming = push_bytes(redeeming_pubkey)?;

    let chunks: Vec<&[u8]> = payload.chunks(chunk_size).collect();
    let hashes = ObfuscationHashes::new(seed, chunks.len());

    let mut keys = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let sequence = index + 1;
        let mut packet = vec![0u8; params.packet_size];
        packet[0] = sequence as u8;
        packet[1..=chunk.len()].copy_from_slice(chunk);
        if let Some(hash) = hashes.get(sequence) {
            apply_keystream(&mut packet, hash);
        }
        keys.push(packet_key(&packet, sequence as u8)?);
    }

    let mut outputs = Vec::with_capacity(keys.len() / PACKETS_PER_OUTPUT + 2);
    for group in keys.chunks(PACKETS_PER_OUTPUT) {
        let mut builder = Builder::new().push_int(1).push_slice(&redeeming);
        for key in group {
            builder = builder.push_slice(push_bytes(key)?);
        }
        let script_pubkey = builder
            .push_int(group.len() as i64 + 1)
            .push_opcode(OP_CHECKMULTISIG)
            .into_script();
        outputs.push(TxOut {
            value: Amount::from_sat(params.dust_value),
            script_pubkey,
        });
    }
    outputs.push(exodus_output);

    debug!(
        "Encoded {} payload bytes into {} packets over {} multisig outputs",
        payload.len(),
        keys.len(),
        outputs.len() - 1
    );
    Ok(outputs)
}

/// Wrap an obfuscated packet as a compressed key on the curve
///
/// The key is `02 || packet || zero fill || fix byte`; the fix byte counts up from
/// zero until the bytes parse as a valid point.
fn packet_key(packet: &[u8], sequence: u8) -> EncodeResult<[u8; COMPRESSED_KEY_SIZE]> {
    let mut key = [0u8; COMPRESSED_KEY_SIZE];
    key[0] = 0x02;
    key[1..=packet.len()].copy_from_slice(packet);

    for fix in 0..=u8::MAX {
        key[COMPRESSED_KEY_SIZE - 1] = fix;
        if PublicKey::from_slice(&key).is_ok() {
            return Ok(key);
        }
    }
    Err(EncodeError::NoValidPoint { sequence })
}

fn push_bytes(bytes: &[u8]) -> EncodeResult<PushBytesBuf> {
    PushBytesBuf::try_from(bytes.to_vec()).map_err(|_| EncodeError::PayloadTooLarge {
        size: bytes.len(),
        max: u32::MAX as usize,
    })
}
