//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters for writes and batch outcomes)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Whatever metrics exporter the hosting process installs
//! ```

pub mod logging;
pub mod metrics;
