//! Camp Haven wallet automation library.
//!
//! Signs in a batch of EVM wallets through a real browser page and runs the
//! daily check-in, referral and stats operations for each of them.

pub mod account;
pub mod browser;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod wallet;

pub use browser::{BrowserSession, ChromeLauncher};
pub use config::AppConfig;
pub use orchestrator::{Action, BatchReport, BatchRunner};
