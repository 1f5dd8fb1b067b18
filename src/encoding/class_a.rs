//! Class A: data in the destination hash of a pay-to-address output
//!
//! A Class A transaction pays the Exodus address, a data address and a reference
//! (receiver) address. The data address hash is `seq || payload[0..19]`, where the
//! payload is a version 0 simple send of MSC or TMSC. The reference output is the
//! one whose first hash byte is `seq + 1`, or failing that the one whose value
//! equals the data output's value.

use crate::errors::{EncodeError, EncodeResult, ParseError, ParseResult};
use crate::script::{classify, decode_address, exodus_destination, Destination};
use crate::types::omni::{ClassAMessage, ClassAProperty};
use crate::types::ProtocolParams;
use bitcoin::{Amount, TxOut};
use tracing::debug;

/// Payload and the outputs it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAPayload {
    pub payload: Vec<u8>,
    pub data_vout: usize,
    pub reference_vout: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    vout: usize,
    hash: [u8; 20],
    value: u64,
}

/// Whether a destination hash carries a Class A simple send
fn is_data_hash(hash: &[u8; 20]) -> bool {
    let header = u32::from_be_bytes([hash[1], hash[2], hash[3], hash[4]]);
    let property = u32::from_be_bytes([hash[5], hash[6], hash[7], hash[8]]);
    header == 0 && ClassAProperty::from_id(property).is_some()
}

/// Extract the Class A payload and identify its data and reference outputs
pub fn decode(outputs: &[TxOut], height: u32, params: &ProtocolParams) -> ParseResult<ClassAPayload> {
    let exodus = exodus_destination(params);

    let candidates: Vec<Candidate> = outputs
        .iter()
        .enumerate()
        .filter_map(|(vout, output)| {
            let class = classify(&output.script_pubkey);
            if !class.is_allowed(height, &params.activation) {
                return None;
            }
            let destination = Destination::from_class(&class)?;
            if Some(destination) == exodus {
                return None;
            }
            Some(Candidate {
                vout,
                hash: *destination.hash(),
                value: output.value.to_sat(),
            })
        })
        .collect();

    let data_outputs: Vec<&Candidate> = candidates
        .iter()
        .filter(|candidate| is_data_hash(&candidate.hash))
        .collect();
    let data = match data_outputs.as_slice() {
        [data] => *data,
        [] => {
            return Err(ParseError::MalformedPayload(
                "no Class A data output".to_string(),
            ))
        }
        _ => {
            return Err(ParseError::MalformedPayload(format!(
                "{} Class A data outputs",
                data_outputs.len()
            )))
        }
    };

    let others = || candidates.iter().filter(move |c| c.vout != data.vout);
    let next_seq = data.hash[0].wrapping_add(1);

    let by_sequence: Vec<&Candidate> = others().filter(|c| c.hash[0] == next_seq).collect();
    let reference = if let [reference] = by_sequence.as_slice() {
        *reference
    } else {
        debug!(
            "{} outputs match sequence {}, falling back to value {}",
            by_sequence.len(),
            next_seq,
            data.value
        );
        let by_value: Vec<&Candidate> = others().filter(|c| c.value == data.value).collect();
        match by_value.as_slice() {
            [reference] => *reference,
            _ => {
                return Err(ParseError::MalformedPayload(format!(
                    "ambiguous Class A reference: {} outputs match by value",
                    by_value.len()
                )))
            }
        }
    };

    let end = (1 + params.class_a_packet_size).min(data.hash.len());
    debug!(
        "Class A data at vout {}, reference at vout {}",
        data.vout, reference.vout
    );
    Ok(ClassAPayload {
        payload: data.hash[1..end].to_vec(),
        data_vout: data.vout,
        reference_vout: reference.vout,
    })
}

/// Lay out a simple send as Exodus, data and receiver outputs
pub fn encode(receiver: &str, payload: &[u8], params: &ProtocolParams) -> EncodeResult<Vec<TxOut>> {
    let max = params.class_a_packet_size.min(19);
    if payload.len() > max {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }
    if ClassAMessage::decode(payload).is_none() {
        return Err(EncodeError::UnsupportedClassA(format!(
            "{} is not a simple send of MSC or TMSC",
            hex::encode(payload)
        )));
    }

    let receiver = decode_address(receiver, params)
        .ok_or_else(|| EncodeError::InvalidAddress(receiver.to_string()))?;
    let exodus = exodus_destination(params)
        .ok_or_else(|| EncodeError::InvalidAddress(params.exodus_address.clone()))?;

    let mut hash = [0u8; 20];
    hash[0] = receiver.hash()[0].wrapping_sub(1);
    hash[1..=payload.len()].copy_from_slice(payload);
    let data = Destination::PubkeyHash(hash);

    let dust = Amount::from_sat(params.dust_value);
    Ok([exodus, data, receiver]
        .iter()
        .map(|destination| TxOut {
            value: dust,
            script_pubkey: destination.script_pubkey(),
        })
        .collect())
}
