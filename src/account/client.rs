//! Account operations executed through an authenticated browser session.

use serde_json::Value;

use crate::account::operations;
use crate::browser::{BrowserLauncher, BrowserSession, GqlReply, SessionResult};
use crate::config::CampaignConfig;
use crate::observability::metrics;

/// Result of the daily check-in mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    /// A check-in record was created.
    Completed { id: String },
    /// No record and no error: the wallet already checked in today.
    AlreadyDone,
    /// The service answered with a GraphQL error.
    Rejected(String),
}

/// Result of applying a referral code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferralOutcome {
    Applied,
    /// Code already set on the account, or not accepted.
    Skipped,
    Rejected(String),
}

/// Referral statistics of the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralStats {
    pub referral_code: String,
    pub referral_count: u64,
}

/// Sub-client for account operations.
pub struct AccountClient<'a, L: BrowserLauncher> {
    session: &'a BrowserSession<L>,
    campaign: &'a CampaignConfig,
}

impl<'a, L: BrowserLauncher> AccountClient<'a, L> {
    pub fn new(session: &'a BrowserSession<L>, campaign: &'a CampaignConfig) -> Self {
        Self { session, campaign }
    }

    /// Record today's check-in.
    pub async fn daily_checkin(&self) -> SessionResult<CheckinOutcome> {
        let user_id = self.session.user_id()?;
        let op = operations::daily_checkin(user_id, self.campaign);

        let outcome = match self.session.execute_gql(&op).await? {
            GqlReply::Error(message) => CheckinOutcome::Rejected(message),
            GqlReply::Data(data) => match data.pointer("/daily_checkin/id").and_then(id_string) {
                Some(id) => CheckinOutcome::Completed { id },
                None => CheckinOutcome::AlreadyDone,
            },
        };

        match &outcome {
            CheckinOutcome::Completed { id } => {
                tracing::info!(user_id = %user_id, record_id = %id, "Check-in complete")
            }
            CheckinOutcome::AlreadyDone => {
                tracing::info!(user_id = %user_id, "Check-in skipped, likely already done today")
            }
            CheckinOutcome::Rejected(message) => {
                tracing::warn!(user_id = %user_id, error = %message, "Check-in rejected")
            }
        }
        metrics::record_action("checkin", checkin_label(&outcome));
        Ok(outcome)
    }

    /// Apply `code` as this account's referrer.
    pub async fn apply_referral(&self, code: &str) -> SessionResult<ReferralOutcome> {
        let user_id = self.session.user_id()?;
        let op = operations::apply_referral(user_id, code);

        let outcome = match self.session.execute_gql(&op).await? {
            GqlReply::Error(message) => ReferralOutcome::Rejected(message),
            GqlReply::Data(data) => {
                if data.pointer("/apply_referral_code/success").and_then(Value::as_bool) == Some(true) {
                    ReferralOutcome::Applied
                } else {
                    ReferralOutcome::Skipped
                }
            }
        };

        match &outcome {
            ReferralOutcome::Applied => tracing::info!(user_id = %user_id, code = %code, "Referral applied"),
            ReferralOutcome::Skipped => tracing::info!(
                user_id = %user_id,
                code = %code,
                "Referral skipped, already set or invalid code"
            ),
            ReferralOutcome::Rejected(message) => {
                tracing::warn!(user_id = %user_id, code = %code, error = %message, "Referral rejected")
            }
        }
        metrics::record_action(
            "referral",
            match outcome {
                ReferralOutcome::Applied => "applied",
                ReferralOutcome::Skipped => "skipped",
                ReferralOutcome::Rejected(_) => "rejected",
            },
        );
        Ok(outcome)
    }

    /// Read referral code and count. `None` when the service has no data.
    pub async fn get_stats(&self) -> SessionResult<Option<ReferralStats>> {
        let user_id = self.session.user_id()?;
        let op = operations::referral_stats(user_id);

        let stats = match self.session.execute_gql(&op).await? {
            GqlReply::Error(message) => {
                tracing::warn!(user_id = %user_id, error = %message, "Stats query returned an error");
                None
            }
            GqlReply::Data(data) => data.get("get_number_of_referrals").and_then(parse_stats),
        };

        if let Some(stats) = &stats {
            tracing::info!(
                user_id = %user_id,
                referral_code = %stats.referral_code,
                referral_count = stats.referral_count,
                "Referral stats"
            );
        }
        metrics::record_action("stats", if stats.is_some() { "found" } else { "empty" });
        Ok(stats)
    }
}

fn checkin_label(outcome: &CheckinOutcome) -> &'static str {
    match outcome {
        CheckinOutcome::Completed { .. } => "completed",
        CheckinOutcome::AlreadyDone => "already_done",
        CheckinOutcome::Rejected(_) => "rejected",
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_stats(value: &Value) -> Option<ReferralStats> {
    let referral_code = value.get("referral_code")?.as_str()?.to_string();
    let referral_count = match value.get("referral_count") {
        Some(Value::Number(n)) => n.as_u64()?,
        Some(Value::String(s)) => s.parse().ok()?,
        _ => 0,
    };
    Some(ReferralStats {
        referral_code,
        referral_count,
    })
}
