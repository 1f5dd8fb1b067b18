use crate::types::EncodingClass;
use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Bitcoin RPC operations
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Transaction could not be parsed as a protocol message
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Payload could not be laid out as transaction outputs
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Typed parse failures
///
/// `NotProtocol` is deliberately absent: a transaction without a payload is an
/// ordinary outcome (`ParseOutcome::NotProtocol`), not a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Marker missing where required, packet too short, or ambiguous outputs
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// An input could not be resolved, or failed the standardness requirement
    #[error("Unresolvable sender: {0}")]
    UnresolvableSender(String),

    /// A structurally valid encoding was used before its activation height
    #[error("Encoding class {class} not active at height {height}")]
    ActivationNotReached { class: EncodingClass, height: u32 },
}

/// Encode-direction failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Address string is not a valid destination for the configured network
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Public key bytes are not a valid secp256k1 point
    #[error("Invalid public key: {0}")]
    InvalidPubkey(String),

    /// Payload exceeds what the encoding class can carry
    #[error("Payload too large: {size} bytes exceeds {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// Payload is not representable in Class A
    #[error("Unsupported Class A payload: {0}")]
    UnsupportedClassA(String),

    /// No valid curve point could be found for an obfuscated packet
    #[error("Could not find a valid public key for packet {sequence}")]
    NoValidPoint { sequence: u8 },
}

/// Failure of the coin lookup collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoinLookupError {
    /// The previous output is unknown to the snapshot
    #[error("Coin not found: {0}")]
    NotFound(bitcoin::OutPoint),
}

impl From<CoinLookupError> for ParseError {
    fn from(err: CoinLookupError) -> Self {
        ParseError::UnresolvableSender(err.to_string())
    }
}

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to establish connection to Bitcoin Core RPC server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// TXID string format is invalid (not valid hex or wrong length)
    #[error("Invalid txid: {txid}")]
    InvalidTxid { txid: String },

    /// RPC method call failed (covers network errors, authentication, etc.)
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Failed to deserialise RPC response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// Retry limit exceeded for RPC operation
    #[error("Max retries exceeded: {operation}")]
    MaxRetriesExceeded { operation: String },

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// Transaction exists in valid format but not found in blockchain/mempool
    #[error("Transaction not found: {txid}")]
    TransactionNotFound { txid: String },
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

/// Result type for the parse orchestrator and payload decoders
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for the encode direction
pub type EncodeResult<T> = Result<T, EncodeError>;

// Additional From implementations for common error types
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for AppError {
    fn from(err: hex::FromHexError) -> Self {
        AppError::InvalidData(format!("Hex decode error: {}", err))
    }
}
