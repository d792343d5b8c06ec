//! Batch orchestration.
//!
//! # Data Flow
//! ```text
//! keys ──▶ runner.rs ──▶ per wallet:
//!                          BrowserSession::init
//!                          → delay.rs (after_login)
//!                          → AccountClient action set
//!                          → BrowserSession::close (every exit path)
//!                        between wallets: delay.rs (between_wallets)
//!      ◀── report.rs (success / failure counts)
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: one browser alive at a time
//! - No retries; a failed wallet is logged and the batch moves on

pub mod delay;
pub mod report;
pub mod runner;

pub use report::{BatchError, BatchReport, WalletOutcome, WalletStatus};
pub use runner::{Action, BatchRunner};
