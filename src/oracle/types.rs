//! Oracle data types and error definitions.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::types::{ChainError, TxReceipt};

/// Academic standing, a closed set mirroring the registrar's taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcademicStanding {
    Good,
    Probation,
    Dismissed,
}

impl std::fmt::Display for AcademicStanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AcademicStanding::Good => "good",
            AcademicStanding::Probation => "probation",
            AcademicStanding::Dismissed => "dismissed",
        })
    }
}

/// Off-chain identity and academic/financial snapshot of one student.
/// Owned by the student store; the oracle treats it as read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: u64,
    pub wallet_address: Address,
    pub name: String,
    pub gpa: f64,
    /// Household income in currency units.
    pub income_level: f64,
    pub academic_standing: AcademicStanding,
    pub documents_verified: bool,
}

/// Admit/deny decision plus justification, prior to any on-chain recording.
/// Deterministic in the record and thresholds; no clock, no randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub eligible: bool,
    pub reason: String,
}

/// Per-student outcome of driving a verdict on-chain.
///
/// `receipt` is present only when a write was attempted (i.e. the student
/// was eligible); an ineligible student still yields a result.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub student_id: u64,
    pub wallet: Address,
    pub verdict: Verdict,
    pub receipt: Option<TxReceipt>,
    /// Unix seconds at assembly time.
    pub timestamp: u64,
}

/// Which write-call shape the loaded contract expects.
///
/// Two contract families exist for the same oracle pattern: one where a
/// sponsor funds an assigned student, one where students claim against a
/// scholarship id. One profile is chosen per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractProfile {
    /// `verifyStudent(address,address,uint256,uint256)` on a
    /// sponsor-managed contract.
    SponsorFunded { sponsor: Address, amount_wei: U256 },
    /// `approveScholarship(address,uint256,uint256)` on a claim-based
    /// contract.
    ScholarshipClaim { scholarship_id: u64 },
}

/// A fully-shaped verification write, ready for the chain client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationCall {
    SponsorFunded {
        student: Address,
        sponsor: Address,
        amount_wei: U256,
        gpa_scaled: u64,
    },
    ScholarshipClaim {
        student: Address,
        scholarship_id: u64,
        gpa_scaled: u64,
    },
}

impl ContractProfile {
    /// Shape the verification write for one student.
    pub fn verification_call(&self, student: &StudentRecord, gpa_scaled: u64) -> VerificationCall {
        match *self {
            ContractProfile::SponsorFunded { sponsor, amount_wei } => {
                VerificationCall::SponsorFunded {
                    student: student.wallet_address,
                    sponsor,
                    amount_wei,
                    gpa_scaled,
                }
            }
            ContractProfile::ScholarshipClaim { scholarship_id } => {
                VerificationCall::ScholarshipClaim {
                    student: student.wallet_address,
                    scholarship_id,
                    gpa_scaled,
                }
            }
        }
    }
}

impl VerificationCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            VerificationCall::SponsorFunded { .. } => "verifyStudent",
            VerificationCall::ScholarshipClaim { .. } => "approveScholarship",
        }
    }

    pub fn student(&self) -> Address {
        match *self {
            VerificationCall::SponsorFunded { student, .. } => student,
            VerificationCall::ScholarshipClaim { student, .. } => student,
        }
    }

    /// Positional arguments in contract order.
    pub fn args(&self) -> Vec<alloy::dyn_abi::DynSolValue> {
        use alloy::dyn_abi::DynSolValue;
        match *self {
            VerificationCall::SponsorFunded {
                student,
                sponsor,
                amount_wei,
                gpa_scaled,
            } => vec![
                DynSolValue::Address(student),
                DynSolValue::Address(sponsor),
                DynSolValue::Uint(amount_wei, 256),
                DynSolValue::Uint(U256::from(gpa_scaled), 256),
            ],
            VerificationCall::ScholarshipClaim {
                student,
                scholarship_id,
                gpa_scaled,
            } => vec![
                DynSolValue::Address(student),
                DynSolValue::Uint(U256::from(scholarship_id), 256),
                DynSolValue::Uint(U256::from(gpa_scaled), 256),
            ],
        }
    }
}

/// Errors surfaced by the oracle layer.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Operation attempted before the required setup.
    #[error("oracle not configured: {0}")]
    NotConfigured(&'static str),

    /// Student id not present in the store.
    #[error("unknown student id {0}")]
    UnknownStudent(u64),

    /// Chain-layer failure, propagated unchanged.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

/// Current time as unix seconds.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
