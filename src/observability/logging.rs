//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at process start
//! - Log level configurable via RUST_LOG, defaulting to info for this crate
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Private key material is never a log field anywhere in the crate

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Safe to call once; subsequent calls are ignored (tests may race on
/// init otherwise).
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholarship_oracle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
