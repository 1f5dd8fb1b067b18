/// Step-by-step inspection of how a transaction is parsed
///
/// Where a parse only reports its final outcome, the inspection keeps every
/// intermediate decision so a failing or surprising transaction can be examined:
///
/// 1. **Outputs**: script class, address and activation state of each output
/// 2. **Decision**: the encoding class chosen for the outputs
/// 3. **Sender**: the algorithm used and the address it resolved, or why it failed
/// 4. **Packets**: for Class B, every packet before and after deobfuscation
/// 5. **Outcome**: the result of the full parse
use crate::coins::CoinLookup;
use crate::encoding::class_b::{self, ClassBPacket};
use crate::encoding::{classify_outputs, ClassDecision};
use crate::parser::parse;
use crate::rpc::BitcoinRpcClient;
use crate::script::{address_of, classify, is_exodus};
use crate::sender::{resolve_sender, SenderAlgorithm};
use crate::types::{EncodingClass, ParseOutcome, ProtocolParams};
use anyhow::{Context, Result};
use bitcoin::{Transaction, Txid};
use serde::Serialize;
use std::fmt::Write;

/// Everything the parser looked at for one transaction
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub txid: String,
    pub height: u32,
    pub input_count: usize,
    pub outputs: Vec<OutputInspection>,
    pub decision: String,
    pub class: Option<EncodingClass>,
    pub sender_algorithm: Option<SenderAlgorithm>,
    pub sender: Option<String>,
    pub sender_error: Option<String>,
    pub packets: Vec<ClassBPacket>,
    pub packet_error: Option<String>,
    pub outcome: Option<ParseOutcome>,
    pub parse_error: Option<String>,
}

/// One output as seen by the classifiers
#[derive(Debug, Clone, Serialize)]
pub struct OutputInspection {
    pub vout: usize,
    pub value: u64,
    pub script_class: &'static str,
    pub address: Option<String>,
    pub exodus: bool,
    /// Whether the output type is active at the inspected height
    pub allowed: bool,
}

/// Fetch a transaction and its previous outputs over RPC and inspect it
pub async fn inspect_transaction(
    txid: &Txid,
    rpc_client: &BitcoinRpcClient,
    height: u32,
    params: &ProtocolParams,
) -> Result<Inspection> {
    let tx = rpc_client
        .get_transaction(txid)
        .await
        .context("Failed to fetch transaction from Bitcoin Core")?;

    let coins = rpc_client
        .fetch_coin_view(&tx)
        .await
        .context("Failed to fetch previous outputs")?;

    Ok(inspect(&tx, height, &coins, params))
}

/// Inspect a transaction against a coin snapshot
pub fn inspect<C: CoinLookup + ?Sized>(
    tx: &Transaction,
    height: u32,
    coins: &C,
    params: &ProtocolParams,
) -> Inspection {
    let outputs = tx
        .output
        .iter()
        .enumerate()
        .map(|(vout, output)| {
            let class = classify(&output.script_pubkey);
            OutputInspection {
                vout,
                value: output.value.to_sat(),
                script_class: class.name(),
                address: address_of(&output.script_pubkey, params),
                exodus: is_exodus(&output.script_pubkey, params),
                allowed: class.is_allowed(height, &params.activation),
            }
        })
        .collect();

    let decision = classify_outputs(&tx.output, height, params);
    let class = match decision {
        ClassDecision::Class(class) => Some(class),
        _ => None,
    };

    let mut inspection = Inspection {
        txid: tx.compute_txid().to_string(),
        height,
        input_count: tx.input.len(),
        outputs,
        decision: describe(decision),
        class,
        sender_algorithm: class.map(SenderAlgorithm::for_class),
        sender: None,
        sender_error: None,
        packets: Vec::new(),
        packet_error: None,
        outcome: None,
        parse_error: None,
    };

    if let Some(class) = class {
        match resolve_sender(tx, class, height, coins, params) {
            Ok(sender) => inspection.sender = Some(sender),
            Err(e) => inspection.sender_error = Some(e.to_string()),
        }
    }

    if let (Some(EncodingClass::B), Some(sender)) = (class, inspection.sender.as_deref()) {
        match class_b::packets(&tx.output, sender, height, params) {
            Ok(packets) => inspection.packets = packets,
            Err(e) => inspection.packet_error = Some(e.to_string()),
        }
    }

    match parse(tx, height, 0, coins, params) {
        Ok(outcome) => inspection.outcome = Some(outcome),
        Err(e) => inspection.parse_error = Some(e.to_string()),
    }

    inspection
}

fn describe(decision: ClassDecision) -> String {
    match decision {
        ClassDecision::Class(class) => format!("Class {}", class),
        ClassDecision::NotProtocol => "not a protocol transaction".to_string(),
        ClassDecision::NotActivated => "tagged null data before activation".to_string(),
        ClassDecision::SplitMarker => "marker split across pushes".to_string(),
    }
}

impl Inspection {
    /// Human-readable multi-line report
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Transaction: {}", self.txid);
        let _ = writeln!(out, "Height:      {}", self.height);
        let _ = writeln!(out, "Inputs:      {}", self.input_count);
        let _ = writeln!(out, "\nOutputs:");
        for output in &self.outputs {
            let _ = writeln!(
                out,
                "  [{}] {:>12} sats  {:<11} {}{}{}",
                output.vout,
                output.value,
                output.script_class,
                output.address.as_deref().unwrap_or("-"),
                if output.exodus { " (exodus)" } else { "" },
                if output.allowed { "" } else { " (not allowed)" },
            );
        }

        let _ = writeln!(out, "\nDecision:    {}", self.decision);
        if let Some(algorithm) = self.sender_algorithm {
            let _ = writeln!(out, "Sender algo: {}", algorithm);
        }
        match (&self.sender, &self.sender_error) {
            (Some(sender), _) => {
                let _ = writeln!(out, "Sender:      {}", sender);
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "Sender:      unresolved ({})", error);
            }
            _ => {}
        }

        if !self.packets.is_empty() {
            let _ = writeln!(out, "\nClass B packets:");
            for packet in &self.packets {
                let _ = writeln!(
                    out,
                    "  #{:<3} vout {} key {}  obfuscated {}",
                    packet.sequence,
                    packet.vout,
                    packet.position,
                    hex::encode(&packet.obfuscated)
                );
                let _ = writeln!(
                    out,
                    "        seq byte {:<3} clear      {}",
                    packet.embedded_sequence().unwrap_or_default(),
                    hex::encode(&packet.clear)
                );
            }
        }
        if let Some(error) = &self.packet_error {
            let _ = writeln!(out, "\nClass B packets: {}", error);
        }

        let _ = writeln!(out);
        match (&self.outcome, &self.parse_error) {
            (Some(ParseOutcome::Message(message)), _) => {
                let _ = writeln!(out, "Receiver:    {}", message.receiver.as_deref().unwrap_or("-"));
                let _ = writeln!(out, "Fee:         {} sats", message.fee);
                let _ = writeln!(out, "Payload:     {}", message.payload_hex());
                if let Some(header) = message.header() {
                    let _ = writeln!(
                        out,
                        "Header:      version {} type {}{}",
                        header.version,
                        header.message_type,
                        header
                            .known_type()
                            .map(|t| format!(" ({:?})", t))
                            .unwrap_or_default()
                    );
                }
            }
            (Some(ParseOutcome::NotProtocol), _) => {
                let _ = writeln!(out, "Result:      no protocol payload");
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "Result:      {}", error);
            }
            (None, None) => {}
        }
        out
    }
}
