//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (address, user_id, operation) instead of formatted text
//! - Private keys and bearer tokens are never logged

pub mod logging;
pub mod metrics;
