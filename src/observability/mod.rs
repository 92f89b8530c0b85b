//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! keystore / blockchain / contract produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//! ```

pub mod logging;
pub mod metrics;
