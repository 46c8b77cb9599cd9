//! Eligibility rule evaluation.
//!
//! Four ordered rules, short-circuiting at the first failure: the verdict
//! reports only the first violated rule. Pure functions of the record and
//! the configured thresholds.

use crate::oracle::types::{AcademicStanding, StudentRecord, Verdict};

pub const DEFAULT_MIN_GPA: f64 = 3.0;
pub const DEFAULT_MAX_INCOME: f64 = 50_000.0;

/// Configurable eligibility thresholds.
///
/// Changing a threshold affects subsequent evaluations only; verdicts
/// already produced are not revisited.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityRules {
    min_gpa: f64,
    max_income: f64,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            min_gpa: DEFAULT_MIN_GPA,
            max_income: DEFAULT_MAX_INCOME,
        }
    }
}

impl EligibilityRules {
    pub fn new(min_gpa: f64, max_income: f64) -> Self {
        Self { min_gpa, max_income }
    }

    pub fn min_gpa(&self) -> f64 {
        self.min_gpa
    }

    pub fn max_income(&self) -> f64 {
        self.max_income
    }

    pub fn set_min_gpa(&mut self, gpa: f64) {
        self.min_gpa = gpa;
        tracing::info!(min_gpa = gpa, "Minimum GPA requirement updated");
    }

    pub fn set_max_income(&mut self, income: f64) {
        self.max_income = income;
        tracing::info!(max_income = income, "Maximum income threshold updated");
    }

    /// Evaluate the four rules in order.
    pub fn check_eligibility(&self, student: &StudentRecord) -> Verdict {
        // Rule 1: GPA floor
        if student.gpa < self.min_gpa {
            return Verdict {
                eligible: false,
                reason: format!(
                    "GPA too low ({} < {})",
                    fmt_gpa(student.gpa),
                    fmt_gpa(self.min_gpa)
                ),
            };
        }

        // Rule 2: income ceiling
        if student.income_level > self.max_income {
            return Verdict {
                eligible: false,
                reason: format!(
                    "Income exceeds threshold (${} > ${})",
                    fmt_amount(student.income_level),
                    fmt_amount(self.max_income)
                ),
            };
        }

        // Rule 3: academic standing
        if student.academic_standing != AcademicStanding::Good {
            return Verdict {
                eligible: false,
                reason: format!("Academic standing not good ({})", student.academic_standing),
            };
        }

        // Rule 4: document verification
        if !student.documents_verified {
            return Verdict {
                eligible: false,
                reason: "Documents not verified".to_string(),
            };
        }

        Verdict {
            eligible: true,
            reason: format!(
                "Eligible: GPA {}, Income ${}",
                fmt_gpa(student.gpa),
                fmt_amount(student.income_level)
            ),
        }
    }
}

/// Map a decimal GPA to the contract's integer scale (two decimal places):
/// 3.85 → 385. The same mapping is used for every value crossing into an
/// integer-only on-chain representation, so round-trips lose nothing beyond
/// the chosen precision.
pub fn gpa_to_contract_scale(gpa: f64) -> u64 {
    (gpa * 100.0).round() as u64
}

/// GPAs always carry at least one decimal: 3.0, not 3.
fn fmt_gpa(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Currency amounts print as whole units when they are whole: $25000.
fn fmt_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
