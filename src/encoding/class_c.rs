//! Class C: marker-tagged null-data outputs
//!
//! Every allowed null-data output whose first push begins with the marker
//! contributes to the payload, in output order. The marker is removed from each of
//! them and their remaining pushes are appended as they are. Null-data outputs
//! without the marker are ignored.

use crate::encoding::classify::has_marker;
use crate::errors::{EncodeError, EncodeResult, ParseError, ParseResult};
use crate::script::{classify, script_for_address, ScriptClass};
use crate::types::ProtocolParams;
use bitcoin::opcodes::all::OP_RETURN;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::{Amount, TxOut};
use tracing::debug;

/// Extract the Class C payload from the outputs
pub fn decode(outputs: &[TxOut], height: u32, params: &ProtocolParams) -> ParseResult<Vec<u8>> {
    let mut payload = Vec::new();
    let mut tagged = 0usize;

    for (vout, output) in outputs.iter().enumerate() {
        let class = classify(&output.script_pubkey);
        if !class.is_allowed(height, &params.activation) {
            continue;
        }
        let ScriptClass::NullData { pushes } = class else {
            continue;
        };
        if !has_marker(&pushes, &params.marker) {
            debug!("Ignoring untagged null-data output at vout {}", vout);
            continue;
        }

        tagged += 1;
        payload.extend_from_slice(&pushes[0][params.marker.len()..]);
        for push in &pushes[1..] {
            payload.extend_from_slice(push);
        }
    }

    if tagged == 0 {
        return Err(ParseError::MalformedPayload(
            "no allowed null-data output carries the marker".to_string(),
        ));
    }
    debug!("Class C payload assembled from {} tagged outputs", tagged);

    let max = params.max_payload_size();
    if payload.len() > max {
        debug!("Trimming Class C payload from {} to {} bytes", payload.len(), max);
        payload.truncate(max);
    }
    Ok(payload)
}

/// Lay out the payload as null-data outputs plus an optional receiver output
///
/// The payload is split so that marker and chunk together fit in `max_push_size`
/// bytes. Each chunk becomes one null-data output with the marker in front.
pub fn encode(
    payload: &[u8],
    receiver: Option<&str>,
    params: &ProtocolParams,
) -> EncodeResult<Vec<TxOut>> {
    let max = params.max_payload_size();
    if payload.len() > max {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }

    let receiver_script = receiver
        .map(|address| {
            script_for_address(address, params)
                .ok_or_else(|| EncodeError::InvalidAddress(address.to_string()))
        })
        .transpose()?;

    if params.max_push_size <= params.marker.len() {
        return Err(EncodeError::PayloadTooLarge {
            size: params.marker.len() + 1,
            max: params.max_push_size,
        });
    }
    let chunk_size = params.max_push_size - params.marker.len();

    // An empty payload still needs one tagged output
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![payload]
    } else {
        payload.chunks(chunk_size).collect()
    };

    let mut outputs = Vec::with_capacity(chunks.len() + 1);
    for chunk in chunks {
        let mut data = Vec::with_capacity(params.marker.len() + chunk.len());
        data.extend_from_slice(&params.marker);
        data.extend_from_slice(chunk);
        let push = PushBytesBuf::try_from(data).map_err(|_| EncodeError::PayloadTooLarge {
            size: params.marker.len() + chunk.len(),
            max: params.max_push_size,
        })?;
        outputs.push(TxOut {
            value: Amount::ZERO,
            script_pubkey: Builder::new()
                .push_opcode(OP_RETURN)
                .push_slice(push)
                .into_script(),
        });
    }

    if let Some(script_pubkey) = receiver_script {
        outputs.push(TxOut {
            value: Amount::from_sat(params.dust_value),
            script_pubkey,
        });
    }

    debug!(
        "Encoded {} payload bytes into {} Class C outputs",
        payload.len(),
        outputs.len()
    );
    Ok(outputs)
}
