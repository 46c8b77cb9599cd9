//! Batch verification failure-isolation tests.
//!
//! Uses a stub chain so no node is required: submission failures are
//! injected per wallet, and mined-but-failed receipts are simulated.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, B256, U256};

use scholarship_oracle::chain::{ChainError, ChainResult, TxReceipt, TxStatus};
use scholarship_oracle::oracle::{
    AcademicStanding, ContractProfile, EligibilityOracle, EligibilityRules, OracleError,
    ScholarshipChain, StudentRecord, VerificationCall,
};
use scholarship_oracle::store::InMemoryStudentStore;

/// Stub chain: succeeds by default, fails submission for flagged wallets,
/// returns a status-0 receipt for wallets flagged as reverting on-chain.
#[derive(Default)]
struct StubChain {
    fail_submission_for: HashSet<Address>,
    mined_failure_for: HashSet<Address>,
    calls: Mutex<Vec<VerificationCall>>,
    next_block: AtomicU64,
}

impl StubChain {
    fn receipt(&self, status: TxStatus) -> TxReceipt {
        TxReceipt {
            tx_hash: B256::repeat_byte(0xab),
            block_number: self.next_block.fetch_add(1, Ordering::SeqCst),
            gas_used: 58_000,
            status,
        }
    }
}

impl ScholarshipChain for StubChain {
    async fn record_verification(&self, call: &VerificationCall) -> ChainResult<TxReceipt> {
        let student = call.student();
        if self.fail_submission_for.contains(&student) {
            return Err(ChainError::Connectivity(
                "injected submission failure".to_string(),
            ));
        }
        self.calls.lock().unwrap().push(call.clone());
        if self.mined_failure_for.contains(&student) {
            return Ok(self.receipt(TxStatus::Failed));
        }
        Ok(self.receipt(TxStatus::Success))
    }

    async fn record_gpa_update(
        &self,
        _student: Address,
        _gpa_scaled: u64,
    ) -> ChainResult<TxReceipt> {
        Ok(self.receipt(TxStatus::Success))
    }

    async fn student_record(&self, _wallet: Address) -> ChainResult<Vec<DynSolValue>> {
        Ok(vec![DynSolValue::Uint(U256::from(380), 256)])
    }
}

fn student(id: u64) -> StudentRecord {
    StudentRecord {
        student_id: id,
        wallet_address: Address::repeat_byte(id as u8),
        name: format!("Student {}", id),
        gpa: 3.8,
        income_level: 25000.0,
        academic_standing: AcademicStanding::Good,
        documents_verified: true,
    }
}

fn oracle(
    students: Vec<StudentRecord>,
    chain: StubChain,
) -> EligibilityOracle<InMemoryStudentStore, StubChain> {
    EligibilityOracle::new(
        InMemoryStudentStore::from_records(students),
        Some(chain),
        EligibilityRules::default(),
        ContractProfile::SponsorFunded {
            sponsor: Address::repeat_byte(0x99),
            amount_wei: U256::from(1_000_000_000_000_000_000u64),
        },
    )
}

#[tokio::test]
async fn partial_failure_never_aborts_the_batch() {
    // Five eligible students; submissions for two of them fail.
    let mut chain = StubChain::default();
    chain.fail_submission_for.insert(Address::repeat_byte(2));
    chain.fail_submission_for.insert(Address::repeat_byte(4));

    let oracle = oracle((1..=5).map(student).collect(), chain);
    let results = oracle.batch_verify_students(None).await;

    // Exactly the three successes come back, in input order.
    let ids: Vec<u64> = results.iter().map(|r| r.student_id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
    for result in &results {
        let receipt = result.receipt.as_ref().unwrap();
        assert_eq!(receipt.status, TxStatus::Success);
    }
}

#[tokio::test]
async fn mined_but_failed_write_is_a_distinct_failure() {
    let mut chain = StubChain::default();
    chain.mined_failure_for.insert(Address::repeat_byte(1));

    let oracle = oracle(vec![student(1)], chain);
    let err = oracle
        .verify_student_on_chain(&student(1))
        .await
        .unwrap_err();

    match err {
        OracleError::Chain(ChainError::Committed { gas_used, .. }) => {
            // Gas was spent even though the state change failed.
            assert_eq!(gas_used, 58_000);
        }
        other => panic!("expected Committed, got: {other}"),
    }

    // And the batch as a whole still tolerates it.
    let results = oracle.batch_verify_students(None).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn ineligible_students_yield_results_without_writes() {
    let mut ineligible = student(2);
    ineligible.documents_verified = false;

    let oracle = oracle(vec![student(1), ineligible], StubChain::default());
    let results = oracle.batch_verify_students(None).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].receipt.is_some());
    assert!(results[1].receipt.is_none());
    assert_eq!(results[1].verdict.reason, "Documents not verified");

    // Only the eligible student produced a contract call.
    let calls = oracle.chain_calls();
    assert_eq!(calls, vec![Address::repeat_byte(1)]);
}

#[tokio::test]
async fn explicit_id_list_controls_order_and_membership() {
    let oracle = oracle((1..=3).map(student).collect(), StubChain::default());
    let results = oracle.batch_verify_students(Some(&[3, 1])).await;
    let ids: Vec<u64> = results.iter().map(|r| r.student_id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn sponsor_profile_shapes_the_write() {
    let oracle = oracle(vec![student(1)], StubChain::default());
    let result = oracle.verify_student_on_chain(&student(1)).await.unwrap();
    assert!(result.verdict.eligible);

    let chain = oracle.chain_ref();
    let calls = chain.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        VerificationCall::SponsorFunded {
            sponsor,
            amount_wei,
            gpa_scaled,
            ..
        } => {
            assert_eq!(*sponsor, Address::repeat_byte(0x99));
            assert_eq!(*amount_wei, U256::from(1_000_000_000_000_000_000u64));
            assert_eq!(*gpa_scaled, 380);
        }
        other => panic!("unexpected call shape: {other:?}"),
    }
    assert_eq!(calls[0].function_name(), "verifyStudent");
}

/// Test-only views over the oracle's stub chain.
trait StubAccess {
    fn chain_ref(&self) -> &StubChain;
    fn chain_calls(&self) -> Vec<Address>;
}

impl StubAccess for EligibilityOracle<InMemoryStudentStore, StubChain> {
    fn chain_ref(&self) -> &StubChain {
        self.chain_handle().expect("stub chain configured")
    }

    fn chain_calls(&self) -> Vec<Address> {
        self.chain_ref()
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.student())
            .collect()
    }
}
