//! Eligibility oracle subsystem.
//!
//! # Data Flow
//! ```text
//! StudentStore (off-chain records, read-only)
//!     → rules.rs (deterministic verdicts from configured thresholds)
//!     → service.rs (profile-shaped contract writes, batch isolation)
//!     → chain subsystem (signing, submission, receipts)
//! ```
//!
//! Scholarship disbursement for N students is never all-or-nothing: each
//! write stands alone, and batch operations report per-student outcomes.

pub mod rules;
pub mod service;
pub mod types;

pub use rules::{gpa_to_contract_scale, EligibilityRules};
pub use service::{EligibilityOracle, ScholarshipChain};
pub use types::{
    AcademicStanding, ContractProfile, OracleError, OracleResult, StudentRecord,
    VerificationCall, VerificationResult, Verdict,
};
