//! Chain client subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (private key)
//!     → wallet.rs (key loading, nonce reservation, signing identity)
//!     → client.rs (RPC connection with timeouts, chain state reads)
//!     → contract.rs (function table, encode, sign, submit, confirm)
//! ```
//!
//! # Security Constraints
//! - Private key ONLY from the environment, never logged or serialized
//! - Every RPC round trip has a configurable timeout
//! - Nonce reservation is serialized through one atomic counter per signer

pub mod client;
pub mod contract;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use contract::{DeployedContract, LoadedContract};
pub use types::{ChainConfig, ChainError, ChainResult, TxReceipt, TxStatus};
pub use wallet::Wallet;
