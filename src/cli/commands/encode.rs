use super::ConfigArgs;
use crate::encoding::{encode, EncodeRequest};
use crate::errors::AppResult;
use crate::script::{address_of, classify};
use crate::types::ProtocolParams;
use bitcoin::TxOut;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

/// Lay out a payload as protocol outputs and print them as JSON
#[derive(Args)]
pub struct EncodeCommand {
    #[command(subcommand)]
    pub class: EncodeClass,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Subcommand)]
pub enum EncodeClass {
    /// Simple send of MSC or TMSC hidden in a data address
    ClassA {
        /// Receiving address
        #[arg(long)]
        receiver: String,
        /// Payload as hex (at most 19 bytes)
        #[arg(long)]
        payload: String,
    },
    /// Obfuscated packets in bare multisig outputs
    ClassB {
        /// Sending address, used as the obfuscation seed
        #[arg(long)]
        sender: String,
        /// Public key placed first in every multisig output, as hex
        #[arg(long)]
        redeeming_pubkey: String,
        /// Payload as hex
        #[arg(long)]
        payload: String,
    },
    /// Marker-tagged null-data outputs
    ClassC {
        /// Optional reference output
        #[arg(long)]
        receiver: Option<String>,
        /// Payload as hex
        #[arg(long)]
        payload: String,
    },
}

impl EncodeClass {
    pub fn to_request(&self) -> AppResult<EncodeRequest> {
        Ok(match self {
            EncodeClass::ClassA { receiver, payload } => EncodeRequest::ClassA {
                receiver: receiver.clone(),
                payload: hex::decode(payload)?,
            },
            EncodeClass::ClassB {
                sender,
                redeeming_pubkey,
                payload,
            } => EncodeRequest::ClassB {
                sender: sender.clone(),
                redeeming_pubkey: hex::decode(redeeming_pubkey)?,
                payload: hex::decode(payload)?,
            },
            EncodeClass::ClassC { receiver, payload } => EncodeRequest::ClassC {
                receiver: receiver.clone(),
                payload: hex::decode(payload)?,
            },
        })
    }
}

/// An encoded output as printed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedOutput {
    pub vout: usize,
    pub value: u64,
    pub script_pubkey: String,
    pub script_class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl EncodedOutput {
    pub fn describe(outputs: &[TxOut], params: &ProtocolParams) -> Vec<Self> {
        outputs
            .iter()
            .enumerate()
            .map(|(vout, output)| Self {
                vout,
                value: output.value.to_sat(),
                script_pubkey: hex::encode(output.script_pubkey.as_bytes()),
                script_class: classify(&output.script_pubkey).name(),
                address: address_of(&output.script_pubkey, params),
            })
            .collect()
    }
}

impl EncodeCommand {
    pub fn run(&self) -> AppResult<()> {
        let (_, params) = self.config.protocol_params()?;
        let request = self.class.to_request()?;
        let outputs = encode(&request, &params)?;
        info!(
            "Encoded Class {} payload into {} outputs",
            request.class(),
            outputs.len()
        );

        let described = EncodedOutput::describe(&outputs, &params);
        println!("{}", serde_json::to_string_pretty(&described)?);
        Ok(())
    }
}
