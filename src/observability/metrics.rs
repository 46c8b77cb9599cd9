//! Metrics collection.
//!
//! # Metrics
//! - `oracle_tx_submitted_total` (counter): writes broadcast, by function
//! - `oracle_tx_failed_total` (counter): writes rejected at submission
//! - `oracle_batch_runs_total` (counter): batch verifications executed
//! - `oracle_batch_students_total` (counter): per-student outcomes, by result
//!
//! # Design Decisions
//! - Uses the `metrics` facade; the hosting process picks the exporter
//! - Labels are low-cardinality (function names, outcome)

/// Record a transaction handed to the network.
pub fn record_tx_submitted(function: &str) {
    metrics::counter!("oracle_tx_submitted_total", "function" => function.to_string())
        .increment(1);
}

/// Record a transaction the node rejected at submission.
pub fn record_tx_failed(function: &str) {
    metrics::counter!("oracle_tx_failed_total", "function" => function.to_string()).increment(1);
}

/// Record the outcome tally of one batch verification run.
pub fn record_batch(succeeded: u64, attempted: u64) {
    metrics::counter!("oracle_batch_runs_total").increment(1);
    metrics::counter!("oracle_batch_students_total", "outcome" => "succeeded")
        .increment(succeeded);
    metrics::counter!("oracle_batch_students_total", "outcome" => "failed")
        .increment(attempted.saturating_sub(succeeded));
}
