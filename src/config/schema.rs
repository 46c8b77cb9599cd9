//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config
//! files; every field has a default so minimal configs parse.

use serde::{Deserialize, Serialize};

use crate::oracle::types::StudentRecord;

/// Root configuration for the oracle service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OracleConfig {
    /// RPC endpoint and transaction settings.
    pub chain: ChainConfig,

    /// Contract address, interface, and write-call profile.
    pub contract: ContractConfig,

    /// Eligibility thresholds.
    pub eligibility: EligibilityConfig,

    /// Seed records for the in-memory store. Deployments with a real
    /// student database leave this empty.
    pub students: Vec<StudentRecord>,
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Expected chain ID (e.g., 1 for Ethereum mainnet, 31337 for local
    /// Anvil). 0 skips the mismatch check.
    pub chain_id: u64,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How long to wait for a submitted transaction's receipt before
    /// reporting its outcome as unknown.
    pub tx_wait_timeout_secs: u64,

    /// Gas price multiplier (1.0 = network estimate, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against fee spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            tx_wait_timeout_secs: 120,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address.
    pub address: String,

    /// Path to the contract ABI JSON file.
    pub abi_path: String,

    /// Which write-call shape the contract expects.
    pub profile: ProfileConfig,
}

/// Contract write-call profile, one per deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileConfig {
    /// Sponsor-managed contract: verifications carry a sponsor address and
    /// a scholarship amount.
    SponsorFunded {
        sponsor: String,
        /// Scholarship amount in wei, as a decimal string (wei amounts
        /// overflow TOML integers).
        amount_wei: String,
    },
    /// Claim-based contract: verifications carry a scholarship id.
    ScholarshipClaim { scholarship_id: u64 },
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig::ScholarshipClaim { scholarship_id: 0 }
    }
}

/// Eligibility threshold configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Minimum GPA requirement.
    pub min_gpa: f64,

    /// Maximum household income in currency units.
    pub max_income: f64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_gpa: crate::oracle::rules::DEFAULT_MIN_GPA,
            max_income: crate::oracle::rules::DEFAULT_MAX_INCOME,
        }
    }
}
