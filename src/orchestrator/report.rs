//! Batch results.

use std::time::Duration;

use thiserror::Error;

use crate::wallet::WalletError;

/// How one wallet's processing ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletStatus {
    Succeeded,
    LoginFailed(String),
    ActionFailed(String),
}

impl WalletStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WalletStatus::Succeeded)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WalletStatus::Succeeded => "succeeded",
            WalletStatus::LoginFailed(_) => "login_failed",
            WalletStatus::ActionFailed(_) => "action_failed",
        }
    }
}

/// Outcome of one wallet in a batch.
#[derive(Debug, Clone)]
pub struct WalletOutcome {
    /// 1-based position in the wallet list.
    pub index: usize,
    pub address: Option<String>,
    pub status: WalletStatus,
    pub elapsed: Duration,
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub wallets: Vec<WalletOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.wallets.iter().filter(|w| w.status.is_success()).count()
    }

    pub fn fail_count(&self) -> usize {
        self.wallets.len() - self.success_count()
    }

    /// A batch is worth reporting as successful when any wallet succeeded.
    pub fn any_succeeded(&self) -> bool {
        self.success_count() > 0
    }
}

/// Errors that stop a batch before any wallet is processed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No private keys to process")]
    NoWallets,

    #[error("Could not load private keys: {0}")]
    Keys(#[from] WalletError),
}

/// Human-readable duration used in progress logs.
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) as f64 / 1_000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}
