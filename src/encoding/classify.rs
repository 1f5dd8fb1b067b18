use crate::script::{classify, is_exodus, ScriptClass};
use crate::types::{EncodingClass, ProtocolParams};
use bitcoin::TxOut;
use tracing::debug;

/// Outcome of the encoding-class decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassDecision {
    Class(EncodingClass),
    NotProtocol,
    /// A tagged null-data output exists, but null data is not active at this height
    NotActivated,
    /// The first null-data output only forms the marker when its pushes are joined
    SplitMarker,
}

/// Decide which encoding class the outputs use
///
/// Checked in order: a marker-tagged null-data output (Class C), the Exodus output
/// next to an allowed bare multisig output (Class B), the Exodus output alone
/// (Class A).
pub fn classify_outputs(outputs: &[TxOut], height: u32, params: &ProtocolParams) -> ClassDecision {
    let null_data_active = params.activation.null_data_active(height);

    let mut null_data: Vec<Vec<Vec<u8>>> = Vec::new();
    let mut has_exodus = false;
    let mut has_multisig = false;

    for output in outputs {
        let class = classify(&output.script_pubkey);
        let allowed = class.is_allowed(height, &params.activation);
        match class {
            ScriptClass::NullData { pushes } => null_data.push(pushes),
            ScriptClass::BareMultisig { .. } if allowed => has_multisig = true,
            ScriptClass::PubkeyHash(_) if is_exodus(&output.script_pubkey, params) => {
                has_exodus = true
            }
            _ => {}
        }
    }

    let tagged = null_data
        .iter()
        .any(|pushes| has_marker(pushes, &params.marker));

    if null_data_active {
        if tagged {
            debug!("Marker-tagged null-data output found: Class C");
            return ClassDecision::Class(EncodingClass::C);
        }
        if let Some(first) = null_data.first() {
            if is_split_marker(first, &params.marker) {
                debug!("Marker split across null-data pushes");
                return ClassDecision::SplitMarker;
            }
        }
    }

    if has_exodus && has_multisig {
        debug!("Exodus output with bare multisig: Class B");
        return ClassDecision::Class(EncodingClass::B);
    }
    if has_exodus {
        debug!("Exodus output without bare multisig: Class A");
        return ClassDecision::Class(EncodingClass::A);
    }
    if tagged {
        debug!(
            "Tagged null-data output below activation height {}",
            params.activation.null_data_height
        );
        return ClassDecision::NotActivated;
    }

    ClassDecision::NotProtocol
}

/// Whether the first push of a null-data output starts with the marker
pub fn has_marker(pushes: &[Vec<u8>], marker: &[u8]) -> bool {
    pushes
        .first()
        .map_or(false, |first| first.starts_with(marker))
}

fn is_split_marker(pushes: &[Vec<u8>], marker: &[u8]) -> bool {
    pushes.len() > 1 && !has_marker(pushes, marker) && pushes.concat().starts_with(marker)
}
