//! Eligibility oracle: rule evaluation driving on-chain writes.
//!
//! # Responsibilities
//! - Evaluate eligibility locally, then record verified students on-chain
//! - Tolerate per-student failures inside a batch: one student's failure
//!   never aborts the rest
//! - Keep the chain and store behind seams so tests can substitute both
//!
//! Writes are never retried here. A write is not idempotent, so retry
//! policy belongs to the caller, who can reconcile unknown outcomes via
//! `ChainClient::get_transaction_status`.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use std::future::Future;

use crate::chain::client::ChainClient;
use crate::chain::types::{ChainError, ChainResult, TxReceipt, TxStatus};
use crate::observability::metrics;
use crate::oracle::rules::{gpa_to_contract_scale, EligibilityRules};
use crate::oracle::types::{
    unix_now, ContractProfile, OracleError, OracleResult, StudentRecord, VerificationCall,
    VerificationResult, Verdict,
};
use crate::store::StudentStore;

/// The oracle's view of the scholarship contract.
///
/// `ChainClient` is the production implementation; tests inject stubs to
/// exercise batch failure isolation without a node.
pub trait ScholarshipChain {
    /// Submit the write that records one student verification.
    fn record_verification(
        &self,
        call: &VerificationCall,
    ) -> impl Future<Output = ChainResult<TxReceipt>> + Send;

    /// Submit the admin write that updates a student's GPA.
    fn record_gpa_update(
        &self,
        student: Address,
        gpa_scaled: u64,
    ) -> impl Future<Output = ChainResult<TxReceipt>> + Send;

    /// Read the contract's public `students` mapping entry.
    fn student_record(
        &self,
        wallet: Address,
    ) -> impl Future<Output = ChainResult<Vec<DynSolValue>>> + Send;
}

impl ScholarshipChain for ChainClient {
    async fn record_verification(&self, call: &VerificationCall) -> ChainResult<TxReceipt> {
        self.call_write(call.function_name(), &call.args(), U256::ZERO, None)
            .await
    }

    async fn record_gpa_update(&self, student: Address, gpa_scaled: u64) -> ChainResult<TxReceipt> {
        let args = [
            DynSolValue::Address(student),
            DynSolValue::Uint(U256::from(gpa_scaled), 256),
        ];
        self.call_write("updateStudentGPA", &args, U256::ZERO, None)
            .await
    }

    async fn student_record(&self, wallet: Address) -> ChainResult<Vec<DynSolValue>> {
        self.call_read("students", &[DynSolValue::Address(wallet)])
            .await
    }
}

/// Translates eligibility rules into deterministic verdicts and drives the
/// corresponding contract writes.
#[derive(Debug)]
pub struct EligibilityOracle<S, C> {
    store: S,
    chain: Option<C>,
    rules: EligibilityRules,
    profile: ContractProfile,
}

impl<S: StudentStore, C: ScholarshipChain> EligibilityOracle<S, C> {
    pub fn new(store: S, chain: Option<C>, rules: EligibilityRules, profile: ContractProfile) -> Self {
        Self {
            store,
            chain,
            rules,
            profile,
        }
    }

    pub fn rules(&self) -> &EligibilityRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Update the GPA floor for all subsequent evaluations.
    pub fn set_min_gpa(&mut self, gpa: f64) {
        self.rules.set_min_gpa(gpa);
    }

    /// Update the income ceiling for all subsequent evaluations.
    pub fn set_max_income(&mut self, income: f64) {
        self.rules.set_max_income(income);
    }

    /// Evaluate the rules for one student. Pure; no chain interaction.
    pub fn check_eligibility(&self, student: &StudentRecord) -> Verdict {
        self.rules.check_eligibility(student)
    }

    /// The configured chain, if any. Absent in rules-only deployments.
    pub fn chain_handle(&self) -> Option<&C> {
        self.chain.as_ref()
    }

    fn chain(&self) -> OracleResult<&C> {
        self.chain
            .as_ref()
            .ok_or(OracleError::NotConfigured("chain client with signer"))
    }

    /// Compute the verdict for a student and, when eligible, record it
    /// on-chain through the configured contract profile.
    ///
    /// A mined-but-failed write surfaces as [`ChainError::Committed`]; other
    /// chain failures propagate unchanged. Either way the log carries the
    /// student id, function, and cause, so no resubmission is needed to
    /// diagnose.
    pub async fn verify_student_on_chain(
        &self,
        student: &StudentRecord,
    ) -> OracleResult<VerificationResult> {
        let verdict = self.check_eligibility(student);
        tracing::info!(
            student_id = student.student_id,
            name = %student.name,
            eligible = verdict.eligible,
            reason = %verdict.reason,
            "Evaluated eligibility"
        );

        let chain = self.chain()?;

        let receipt = if verdict.eligible {
            let call = self
                .profile
                .verification_call(student, gpa_to_contract_scale(student.gpa));

            match chain.record_verification(&call).await {
                Ok(receipt) if receipt.status == TxStatus::Failed => {
                    tracing::error!(
                        student_id = student.student_id,
                        function = call.function_name(),
                        tx_hash = %receipt.tx_hash,
                        "Verification transaction mined but failed"
                    );
                    return Err(OracleError::Chain(ChainError::Committed {
                        tx_hash: receipt.tx_hash,
                        gas_used: receipt.gas_used,
                    }));
                }
                Ok(receipt) => {
                    tracing::info!(
                        student_id = student.student_id,
                        tx_hash = %receipt.tx_hash,
                        "Verification recorded on-chain"
                    );
                    Some(receipt)
                }
                Err(e) => {
                    tracing::error!(
                        student_id = student.student_id,
                        function = call.function_name(),
                        error = %e,
                        "Failed to record verification on-chain"
                    );
                    return Err(e.into());
                }
            }
        } else {
            // Ineligible students get no write; the verdict alone is the
            // outcome.
            None
        };

        Ok(VerificationResult {
            student_id: student.student_id,
            wallet: student.wallet_address,
            verdict,
            receipt,
            timestamp: unix_now(),
        })
    }

    /// Verify many students, each independently.
    ///
    /// When no id list is given, every student in the store is processed,
    /// in store iteration order; with a list, in list order. Unknown ids
    /// and per-student failures are logged and skipped; the batch never
    /// fails as a whole. Returns the successful results only.
    pub async fn batch_verify_students(&self, student_ids: Option<&[u64]>) -> Vec<VerificationResult> {
        let students: Vec<StudentRecord> = match student_ids {
            None => self.store.get_all_students(),
            Some(ids) => ids
                .iter()
                .filter_map(|&id| {
                    let student = self.store.get_student(id);
                    if student.is_none() {
                        tracing::warn!(student_id = id, "Unknown student id, skipping");
                    }
                    student
                })
                .collect(),
        };

        let attempted = students.len();
        let mut results = Vec::with_capacity(attempted);

        for student in &students {
            match self.verify_student_on_chain(student).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(
                        student_id = student.student_id,
                        error = %e,
                        "Student verification failed"
                    );
                }
            }
        }

        metrics::record_batch(results.len() as u64, attempted as u64);
        tracing::info!(
            succeeded = results.len(),
            attempted,
            "Batch verification complete"
        );

        results
    }

    /// Admin action: push a new GPA for a student on-chain, using the same
    /// integer scale as verification writes.
    pub async fn update_student_gpa_on_chain(
        &self,
        student: &StudentRecord,
        new_gpa: f64,
    ) -> OracleResult<TxReceipt> {
        let chain = self.chain()?;
        let receipt = chain
            .record_gpa_update(student.wallet_address, gpa_to_contract_scale(new_gpa))
            .await?;

        tracing::info!(
            student_id = student.student_id,
            new_gpa,
            tx_hash = %receipt.tx_hash,
            "Student GPA updated on-chain"
        );
        Ok(receipt)
    }

    /// Read back the contract's view of a student, as raw decoded values.
    pub async fn student_on_chain(&self, wallet: Address) -> OracleResult<Vec<DynSolValue>> {
        let chain = self.chain()?;
        Ok(chain.student_record(wallet).await?)
    }

    /// Fetch a student from the store, for callers that only hold an id.
    pub fn student(&self, student_id: u64) -> OracleResult<StudentRecord> {
        self.store
            .get_student(student_id)
            .ok_or(OracleError::UnknownStudent(student_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::types::AcademicStanding;
    use crate::store::InMemoryStudentStore;
    use alloy::primitives::B256;
    use std::sync::Mutex;

    struct RecordingChain {
        calls: Mutex<Vec<VerificationCall>>,
        gpa_updates: Mutex<Vec<(Address, u64)>>,
    }

    impl RecordingChain {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                gpa_updates: Mutex::new(Vec::new()),
            }
        }
    }

    impl ScholarshipChain for RecordingChain {
        async fn record_verification(&self, call: &VerificationCall) -> ChainResult<TxReceipt> {
            self.calls.lock().unwrap().push(call.clone());
            Ok(TxReceipt {
                tx_hash: B256::repeat_byte(0xcd),
                block_number: 1,
                gas_used: 60_000,
                status: TxStatus::Success,
            })
        }

        async fn record_gpa_update(&self, student: Address, gpa: u64) -> ChainResult<TxReceipt> {
            self.gpa_updates.lock().unwrap().push((student, gpa));
            Ok(TxReceipt {
                tx_hash: B256::repeat_byte(0xce),
                block_number: 2,
                gas_used: 40_000,
                status: TxStatus::Success,
            })
        }

        async fn student_record(&self, _: Address) -> ChainResult<Vec<DynSolValue>> {
            Ok(vec![DynSolValue::Uint(U256::from(380), 256)])
        }
    }

    fn student(id: u64, gpa: f64) -> StudentRecord {
        StudentRecord {
            student_id: id,
            wallet_address: Address::repeat_byte(id as u8),
            name: format!("Student {}", id),
            gpa,
            income_level: 25000.0,
            academic_standing: AcademicStanding::Good,
            documents_verified: true,
        }
    }

    fn oracle_with(
        students: Vec<StudentRecord>,
        chain: Option<RecordingChain>,
    ) -> EligibilityOracle<InMemoryStudentStore, RecordingChain> {
        EligibilityOracle::new(
            InMemoryStudentStore::from_records(students),
            chain,
            EligibilityRules::default(),
            ContractProfile::ScholarshipClaim { scholarship_id: 1 },
        )
    }

    #[tokio::test]
    async fn test_verify_requires_configured_chain() {
        let oracle = oracle_with(vec![], None);
        let err = oracle
            .verify_student_on_chain(&student(1, 3.8))
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_eligible_student_gets_write_with_scaled_gpa() {
        let oracle = oracle_with(vec![], Some(RecordingChain::new()));
        let result = oracle
            .verify_student_on_chain(&student(1, 3.85))
            .await
            .unwrap();

        assert!(result.verdict.eligible);
        assert!(result.receipt.is_some());

        let calls = oracle.chain.as_ref().unwrap().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            VerificationCall::ScholarshipClaim { gpa_scaled, .. } => {
                assert_eq!(*gpa_scaled, 385)
            }
            other => panic!("unexpected call shape: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ineligible_student_gets_no_write() {
        let oracle = oracle_with(vec![], Some(RecordingChain::new()));
        let result = oracle
            .verify_student_on_chain(&student(1, 2.0))
            .await
            .unwrap();

        assert!(!result.verdict.eligible);
        assert!(result.receipt.is_none());
        assert!(oracle.chain.as_ref().unwrap().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_skips_unknown_ids() {
        let oracle = oracle_with(
            vec![student(1, 3.5), student(2, 3.6)],
            Some(RecordingChain::new()),
        );
        let results = oracle.batch_verify_students(Some(&[1, 99, 2])).await;
        let ids: Vec<u64> = results.iter().map(|r| r.student_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_gpa_update_uses_contract_scale() {
        let oracle = oracle_with(vec![], Some(RecordingChain::new()));
        let target = student(1, 3.2);
        let receipt = oracle
            .update_student_gpa_on_chain(&target, 3.45)
            .await
            .unwrap();
        assert_eq!(receipt.status, TxStatus::Success);

        let updates = oracle.chain.as_ref().unwrap().gpa_updates.lock().unwrap();
        assert_eq!(updates.as_slice(), &[(target.wallet_address, 345)]);
    }

    #[tokio::test]
    async fn test_student_read_back() {
        let oracle = oracle_with(vec![], Some(RecordingChain::new()));
        let values = oracle
            .student_on_chain(Address::repeat_byte(0x42))
            .await
            .unwrap();
        assert_eq!(values.len(), 1);

        let oracle = oracle_with(vec![], None);
        let err = oracle
            .student_on_chain(Address::repeat_byte(0x42))
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::NotConfigured(_)));
    }

    #[test]
    fn test_store_lookup_by_id() {
        let oracle = oracle_with(vec![student(5, 3.5)], None);
        assert_eq!(oracle.student(5).unwrap().student_id, 5);
        assert!(matches!(
            oracle.student(6),
            Err(OracleError::UnknownStudent(6))
        ));
    }

    #[tokio::test]
    async fn test_batch_all_students_in_store_order() {
        let oracle = oracle_with(
            vec![student(3, 3.5), student(1, 3.6), student(2, 3.7)],
            Some(RecordingChain::new()),
        );
        let results = oracle.batch_verify_students(None).await;
        let ids: Vec<u64> = results.iter().map(|r| r.student_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
