//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Errors that can occur during chain operations.
///
/// The taxonomy separates failures that never reached the network
/// (`Connectivity`, `Reverted` from estimation) from failures that were mined
/// and consumed gas (`Committed`), and from outcomes that are simply unknown
/// (`Timeout`). Callers must not collapse these.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC endpoint unreachable or transport-level failure.
    #[error("cannot reach RPC endpoint: {0}")]
    Connectivity(String),

    /// Connected node reports a different chain than configured.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Malformed address input.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// Read or write attempted before a contract was loaded.
    #[error("contract not loaded; call load_contract first")]
    ContractNotLoaded,

    /// Function name not present in the loaded contract interface.
    /// Caught at lookup time, before any network I/O.
    #[error("contract has no function '{0}'")]
    UnknownFunction(String),

    /// Write or deploy attempted without a configured signing key.
    #[error("no signing key configured")]
    NoSigner,

    /// Invalid private key format or signing failure.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Argument encoding or return decoding failed against the loaded interface.
    #[error("ABI error in '{function}': {message}")]
    Abi { function: String, message: String },

    /// The contract rejected the call during simulation or gas estimation.
    /// No transaction was submitted and no gas was spent.
    #[error("call to '{function}' reverted: {message}")]
    Reverted { function: String, message: String },

    /// The transaction was mined with status 0. Gas was spent; the state
    /// change did not happen.
    #[error("transaction {tx_hash} was mined but failed (gas used: {gas_used})")]
    Committed { tx_hash: TxHash, gas_used: u64 },

    /// Gas price exceeded the configured maximum.
    #[error("gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// The operation did not complete in time. For a submitted transaction
    /// the outcome is unknown; reconcile with `get_transaction_status`.
    #[error("timed out after {seconds}s; outcome unknown")]
    Timeout {
        seconds: u64,
        tx_hash: Option<TxHash>,
    },

    /// Transaction hash unknown to the queried node.
    #[error("transaction {0} not found")]
    NotFound(TxHash),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Binary outcome of a mined transaction, mapped from the receipt status bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TxStatus {
    Success,
    Failed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Success => f.write_str("Success"),
            TxStatus::Failed => f.write_str("Failed"),
        }
    }
}

/// Confirmed outcome of a submitted write. Immutable once produced; the
/// `status` field is the ground truth of success.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub status: TxStatus,
}

impl TxReceipt {
    pub(crate) fn from_rpc(receipt: &alloy::rpc::types::TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used as u64,
            status: if receipt.status() {
                TxStatus::Success
            } else {
                TxStatus::Failed
            },
        }
    }
}

/// Classify a transport-level error from a plain read: anything here means
/// the request did not produce a usable response.
pub(crate) fn transport_error(err: alloy::transports::TransportError) -> ChainError {
    ChainError::Connectivity(err.to_string())
}

/// Classify an error from a contract call or gas estimation: a JSON-RPC
/// error response means the node executed the call and the contract rejected
/// it; anything else is a transport failure.
pub(crate) fn call_error(function: &str, err: alloy::transports::TransportError) -> ChainError {
    match err.as_error_resp() {
        Some(payload) => ChainError::Reverted {
            function: function.to_string(),
            message: payload.message.to_string(),
        },
        None => ChainError::Connectivity(err.to_string()),
    }
}
