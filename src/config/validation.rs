//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address/amount formats before anything
//!   touches the network
//! - Detect duplicate student ids in seed data
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: OracleConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use alloy::primitives::{Address, U256};

use crate::config::schema::{OracleConfig, ProfileConfig};

/// One semantic problem with a config field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &OracleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError {
            field: "chain.rpc_url",
            message: format!("not a valid URL: '{}'", config.chain.rpc_url),
        });
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "chain.rpc_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.chain.tx_wait_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "chain.tx_wait_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.chain.gas_price_multiplier < 1.0 {
        errors.push(ValidationError {
            field: "chain.gas_price_multiplier",
            message: "must be at least 1.0".to_string(),
        });
    }
    if config.chain.max_gas_price_gwei == 0 {
        errors.push(ValidationError {
            field: "chain.max_gas_price_gwei",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError {
            field: "contract.address",
            message: format!("not a valid address: '{}'", config.contract.address),
        });
    }
    if config.contract.abi_path.is_empty() {
        errors.push(ValidationError {
            field: "contract.abi_path",
            message: "must point at the contract ABI JSON file".to_string(),
        });
    }

    match &config.contract.profile {
        ProfileConfig::SponsorFunded { sponsor, amount_wei } => {
            if sponsor.parse::<Address>().is_err() {
                errors.push(ValidationError {
                    field: "contract.profile.sponsor",
                    message: format!("not a valid address: '{}'", sponsor),
                });
            }
            match amount_wei.parse::<U256>() {
                Ok(amount) if amount.is_zero() => errors.push(ValidationError {
                    field: "contract.profile.amount_wei",
                    message: "scholarship amount must be greater than zero".to_string(),
                }),
                Ok(_) => {}
                Err(_) => errors.push(ValidationError {
                    field: "contract.profile.amount_wei",
                    message: format!("not a valid wei amount: '{}'", amount_wei),
                }),
            }
        }
        ProfileConfig::ScholarshipClaim { .. } => {}
    }

    if config.eligibility.min_gpa < 0.0 || config.eligibility.min_gpa > 5.0 {
        errors.push(ValidationError {
            field: "eligibility.min_gpa",
            message: "must be between 0.0 and 5.0".to_string(),
        });
    }
    if config.eligibility.max_income < 0.0 {
        errors.push(ValidationError {
            field: "eligibility.max_income",
            message: "must not be negative".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for student in &config.students {
        if !seen.insert(student.student_id) {
            errors.push(ValidationError {
                field: "students",
                message: format!("duplicate student_id {}", student.student_id),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ContractConfig;

    fn valid_config() -> OracleConfig {
        OracleConfig {
            contract: ContractConfig {
                address: "0x742d35cc6634c0532925a3b844bc2e0e42d79e18".to_string(),
                abi_path: "abi/scholarship_manager.json".to_string(),
                profile: ProfileConfig::ScholarshipClaim { scholarship_id: 1 },
            },
            ..OracleConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.chain.rpc_url = "nope".to_string();
        config.chain.rpc_timeout_secs = 0;
        config.contract.address = "0x123".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_sponsor_profile_amount_checked() {
        let mut config = valid_config();
        config.contract.profile = ProfileConfig::SponsorFunded {
            sponsor: "0x742d35cc6634c0532925a3b844bc2e0e42d79e18".to_string(),
            amount_wei: "0".to_string(),
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "contract.profile.amount_wei"));

        config.contract.profile = ProfileConfig::SponsorFunded {
            sponsor: "not-an-address".to_string(),
            amount_wei: "not-a-number".to_string(),
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_duplicate_student_ids_rejected() {
        use crate::oracle::types::{AcademicStanding, StudentRecord};
        use alloy::primitives::Address;

        let mut config = valid_config();
        let student = StudentRecord {
            student_id: 1,
            wallet_address: Address::repeat_byte(1),
            name: "Alice Chen".to_string(),
            gpa: 3.8,
            income_level: 25000.0,
            academic_standing: AcademicStanding::Good,
            documents_verified: true,
        };
        config.students = vec![student.clone(), student];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "students"));
    }
}
