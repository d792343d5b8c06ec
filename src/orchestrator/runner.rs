//! Sequential batch execution over a wallet list.

use std::sync::Arc;
use std::time::Instant;

use crate::account::AccountClient;
use crate::browser::{BrowserLauncher, BrowserSession, SessionResult};
use crate::config::AppConfig;
use crate::observability::metrics;
use crate::wallet::load_private_keys;
use crate::orchestrator::delay::pause;
use crate::orchestrator::report::{
    format_duration, BatchError, BatchReport, WalletOutcome, WalletStatus,
};

/// The action set performed for every wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Checkin,
    Referral(String),
    Stats,
    /// Referral (when a code is given), then the daily check-in.
    All { referral: Option<String> },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Checkin => "checkin",
            Action::Referral(_) => "referral",
            Action::Stats => "stats",
            Action::All { .. } => "all",
        }
    }
}

/// Runs one action set across wallets, one browser session at a time.
pub struct BatchRunner<L: BrowserLauncher> {
    launcher: Arc<L>,
    config: Arc<AppConfig>,
}

impl<L: BrowserLauncher> BatchRunner<L> {
    pub fn new(launcher: Arc<L>, config: Arc<AppConfig>) -> Self {
        Self { launcher, config }
    }

    /// Load keys from the configured source and run `action` over them.
    ///
    /// Keys are read on every call, so edits to the key file apply to the
    /// next batch.
    pub async fn run_configured(&self, action: &Action) -> Result<BatchReport, BatchError> {
        let keys = load_private_keys(&self.config.wallets)?;
        self.run(&keys, action).await
    }

    /// Process every key in order. Failures are isolated per wallet.
    pub async fn run(&self, keys: &[String], action: &Action) -> Result<BatchReport, BatchError> {
        if keys.is_empty() {
            return Err(BatchError::NoWallets);
        }

        let started = Instant::now();
        let total = keys.len();
        let mut report = BatchReport::default();
        tracing::info!(wallets = total, action = action.name(), "Starting batch");

        for (i, key) in keys.iter().enumerate() {
            let index = i + 1;
            let outcome = self.process_wallet(index, total, key, action).await;
            metrics::record_wallet(outcome.status.label());
            report.wallets.push(outcome);

            if index < total {
                let waited = pause(self.config.delays.between_wallets, "between_wallets").await;
                tracing::info!(
                    wait = %format_duration(waited),
                    next = index + 1,
                    "Waited before next wallet"
                );
            }
        }

        report.elapsed = started.elapsed();
        metrics::record_batch_duration(report.elapsed);
        tracing::info!(
            succeeded = report.success_count(),
            failed = report.fail_count(),
            elapsed = %format_duration(report.elapsed),
            "Batch complete"
        );
        Ok(report)
    }

    async fn process_wallet(&self, index: usize, total: usize, key: &str, action: &Action) -> WalletOutcome {
        let started = Instant::now();
        tracing::info!(wallet = index, total, "Processing wallet");

        let mut session = BrowserSession::new(Arc::clone(&self.launcher), Arc::clone(&self.config));
        let status = match session.init(key).await {
            Err(e) => {
                tracing::error!(wallet = index, error = %e, "Login failed");
                WalletStatus::LoginFailed(e.to_string())
            }
            Ok(_) => match self.perform(&session, action).await {
                Ok(()) => WalletStatus::Succeeded,
                Err(e) => {
                    tracing::error!(wallet = index, error = %e, "Action failed");
                    WalletStatus::ActionFailed(e.to_string())
                }
            },
        };
        session.close().await;

        let elapsed = started.elapsed();
        tracing::info!(
            wallet = index,
            status = status.label(),
            elapsed = %format_duration(elapsed),
            "Wallet done"
        );
        WalletOutcome {
            index,
            address: session.address().map(str::to_string),
            status,
            elapsed,
        }
    }

    async fn perform(&self, session: &BrowserSession<L>, action: &Action) -> SessionResult<()> {
        pause(self.config.delays.after_login, "after_login").await;
        let client = AccountClient::new(session, &self.config.campaign);

        match action {
            Action::Checkin => {
                client.daily_checkin().await?;
            }
            Action::Referral(code) => {
                client.apply_referral(code).await?;
            }
            Action::Stats => {
                client.get_stats().await?;
            }
            Action::All { referral } => {
                if let Some(code) = referral {
                    client.apply_referral(code).await?;
                    pause(self.config.delays.between_actions, "between_actions").await;
                }
                client.daily_checkin().await?;
            }
        }
        Ok(())
    }
}
