//! Off-chain scholarship oracle.
//!
//! Bridges off-chain student records to an Ethereum-compatible scholarship
//! contract: the chain subsystem owns the RPC connection, signing key, and
//! call mechanics; the oracle subsystem turns eligibility rules into
//! deterministic verdicts and drives the corresponding contract writes,
//! isolating failures per student within a batch.

pub mod chain;
pub mod config;
pub mod observability;
pub mod oracle;
pub mod store;

pub use chain::{ChainClient, ChainError, TxReceipt, TxStatus, Wallet};
pub use config::OracleConfig;
pub use oracle::{ContractProfile, EligibilityOracle, EligibilityRules, StudentRecord};
pub use store::{InMemoryStudentStore, StudentStore};
