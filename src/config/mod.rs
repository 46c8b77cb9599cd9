//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → OracleConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changing thresholds at runtime goes
//!   through the oracle's setters, not a config reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{ChainConfig, ContractConfig, EligibilityConfig, OracleConfig, ProfileConfig};
