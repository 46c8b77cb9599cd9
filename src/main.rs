//! Scholarship oracle service binary.
//!
//! Loads configuration, connects to the chain, loads the scholarship
//! contract, and runs one batch verification over the configured students.
//! Without `ORACLE_PRIVATE_KEY` set it falls back to a read-only dry run
//! that evaluates eligibility locally and writes nothing.

use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::primitives::utils::format_ether;

use scholarship_oracle::chain::{ChainClient, Wallet};
use scholarship_oracle::config::{loader, ProfileConfig};
use scholarship_oracle::observability;
use scholarship_oracle::oracle::{ContractProfile, EligibilityOracle, EligibilityRules};
use scholarship_oracle::store::{InMemoryStudentStore, StudentStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::logging::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "oracle.toml".to_string());
    let config = loader::load_config(Path::new(&config_path))?;

    tracing::info!(
        config = %config_path,
        rpc_url = %config.chain.rpc_url,
        students = config.students.len(),
        "scholarship-oracle starting"
    );

    let store = InMemoryStudentStore::from_records(config.students.clone());
    let rules = EligibilityRules::new(config.eligibility.min_gpa, config.eligibility.max_income);
    let profile = match &config.contract.profile {
        ProfileConfig::SponsorFunded { sponsor, amount_wei } => ContractProfile::SponsorFunded {
            sponsor: sponsor.parse()?,
            amount_wei: amount_wei.parse()?,
        },
        ProfileConfig::ScholarshipClaim { scholarship_id } => ContractProfile::ScholarshipClaim {
            scholarship_id: *scholarship_id,
        },
    };

    let wallet = match Wallet::from_env() {
        Ok(wallet) => Some(wallet),
        Err(e) => {
            tracing::warn!(error = %e, "No signing key; running a read-only dry run");
            None
        }
    };
    let dry_run = wallet.is_none();

    let mut client = ChainClient::connect(config.chain.clone(), wallet).await?;

    let abi_json = std::fs::read_to_string(&config.contract.abi_path)?;
    let abi: JsonAbi = serde_json::from_str(&abi_json)?;
    client.load_contract(&config.contract.address, abi)?;

    if let Some(signer) = client.signer_address() {
        let balance = client.get_balance(None).await?;
        tracing::info!(
            signer = %signer,
            balance_eth = %format_ether(balance),
            "Oracle account funded"
        );
    }

    let oracle = EligibilityOracle::new(store, Some(client), rules, profile);

    if dry_run {
        for student in oracle.store().get_all_students() {
            let verdict = oracle.check_eligibility(&student);
            tracing::info!(
                student_id = student.student_id,
                name = %student.name,
                eligible = verdict.eligible,
                reason = %verdict.reason,
                "Dry-run verdict"
            );
        }
        return Ok(());
    }

    let results = oracle.batch_verify_students(None).await;
    for result in &results {
        tracing::info!(
            student_id = result.student_id,
            wallet = %result.wallet,
            eligible = result.verdict.eligible,
            tx_hash = result.receipt.as_ref().map(|r| r.tx_hash.to_string()),
            "Verification result"
        );
    }

    Ok(())
}
