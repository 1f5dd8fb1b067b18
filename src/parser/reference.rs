use crate::script::{address_of, classify, is_exodus};
use crate::types::ProtocolParams;
use bitcoin::TxOut;
use tracing::debug;

/// Receiver of a Class B or C transaction
///
/// Candidates are the allowed pay-to-pubkey-hash and pay-to-script-hash outputs not
/// paying Exodus. A single candidate is the receiver. Otherwise the first candidate
/// paying the sender is taken as change and skipped, and the last remaining one wins.
pub fn identify_receiver(
    outputs: &[TxOut],
    sender: &str,
    height: u32,
    params: &ProtocolParams,
) -> Option<String> {
    let candidates: Vec<String> = outputs
        .iter()
        .filter(|output| {
            let class = classify(&output.script_pubkey);
            class.is_single_address() && class.is_allowed(height, &params.activation)
        })
        .filter(|output| !is_exodus(&output.script_pubkey, params))
        .filter_map(|output| address_of(&output.script_pubkey, params))
        .collect();

    if candidates.len() == 1 {
        return candidates.into_iter().next();
    }

    let mut change_skipped = false;
    let mut receiver = None;
    for candidate in candidates {
        if !change_skipped && candidate == sender {
            change_skipped = true;
            continue;
        }
        receiver = Some(candidate);
    }

    debug!("Receiver: {:?}", receiver);
    receiver
}
