//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the automator.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults matching the live Camp Haven deployment.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed service endpoints.
    pub site: SiteConfig,

    /// Sign-in message parameters.
    pub sign_in: SignInConfig,

    /// Campaign identifiers sent with GraphQL mutations.
    pub campaign: CampaignConfig,

    /// Browser launch settings.
    pub browser: BrowserConfig,

    /// Randomized pauses.
    pub delays: DelayConfig,

    /// Where private keys come from.
    pub wallets: WalletSourceConfig,

    /// Daily schedule for the auto mode.
    pub schedule: ScheduleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Service endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Landing page visited before the handshake.
    pub base_url: String,

    /// Auth API prefix (`/auth/csrf`, `/auth/session`, ...).
    pub api_url: String,

    /// GraphQL endpoint.
    pub gql_url: String,

    /// `callbackUrl` form field submitted with the credentials.
    pub callback_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://camphaven.xyz/".to_string(),
            api_url: "https://camphaven.xyz/api".to_string(),
            gql_url: "https://gql3.absinthe.network/v1/graphql".to_string(),
            callback_url: "https://camphaven.xyz/home".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn csrf_url(&self) -> String {
        format!("{}/auth/csrf", self.api_url.trim_end_matches('/'))
    }

    pub fn credentials_url(&self) -> String {
        format!(
            "{}/auth/callback/credentials",
            self.api_url.trim_end_matches('/')
        )
    }

    pub fn session_url(&self) -> String {
        format!("{}/auth/session", self.api_url.trim_end_matches('/'))
    }
}

/// Parameters of the sign-in message.
///
/// The server verifies the signature against its own rendering of these
/// values, so they must match what the web app signs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignInConfig {
    pub domain: String,
    pub statement: String,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub resources: Vec<String>,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            domain: "camphaven.xyz".to_string(),
            statement: "Please sign with your account".to_string(),
            uri: "https://camphaven.xyz".to_string(),
            version: "1".to_string(),
            chain_id: 1,
            resources: vec!["connector://io.rabby".to_string()],
        }
    }
}

/// Campaign identifiers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// `client_season` tag of the daily check-in mutation.
    pub client_season: String,

    /// Point source that the daily check-in credits.
    pub daily_checkin_source_id: String,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            client_season: "d2ct-npic".to_string(),
            daily_checkin_source_id: "09b99963-757e-46fa-8b79-95d1cdbed7d5".to_string(),
        }
    }
}

/// Browser launch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Explicit Chrome/Chromium binary. Falls back to `candidate_paths`.
    pub executable_path: Option<String>,

    /// Well-known install locations checked in order.
    pub candidate_paths: Vec<String>,

    /// Run without a visible window.
    pub headless: bool,

    /// Upper bound for the landing page navigation, in seconds.
    pub navigation_timeout_secs: u64,

    /// CDP request timeout, in seconds.
    pub request_timeout_secs: u64,

    /// User agent presented by the stealth patches.
    pub user_agent: String,

    /// Extra command line switches.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable_path: None,
            candidate_paths: vec![
                "/usr/bin/google-chrome".to_string(),
                "/usr/bin/google-chrome-stable".to_string(),
                "/usr/bin/chromium".to_string(),
                "/usr/bin/chromium-browser".to_string(),
                "/snap/bin/chromium".to_string(),
            ],
            headless: true,
            navigation_timeout_secs: 60,
            request_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            extra_args: vec![
                "--disable-setuid-sandbox".to_string(),
                "--disable-web-security".to_string(),
                "--disable-features=IsolateOrigins,site-per-process".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

/// Inclusive range of milliseconds to pause for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draw a duration uniformly from `[min_ms, max_ms]`.
    ///
    /// An inverted range collapses to `min_ms`; validation rejects such
    /// ranges before they reach the runner.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

/// Pauses between wallets and actions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DelayConfig {
    pub between_wallets: DelayRange,
    pub between_actions: DelayRange,
    pub after_login: DelayRange,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            between_wallets: DelayRange::new(5_000, 10_000),
            between_actions: DelayRange::new(2_000, 5_000),
            after_login: DelayRange::new(2_000, 4_000),
        }
    }
}

/// Private key sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletSourceConfig {
    /// Newline-delimited key file.
    pub file: String,

    /// Comma-separated keys; takes precedence over `file` when set.
    pub env_var: String,

    /// Required key prefix.
    pub key_prefix: String,

    /// Minimum key length, prefix included.
    pub min_key_len: usize,
}

impl Default for WalletSourceConfig {
    fn default() -> Self {
        Self {
            file: "wallets.txt".to_string(),
            env_var: "CAMPHAVEN_PRIVATE_KEYS".to_string(),
            key_prefix: "0x".to_string(),
            min_key_len: 64,
        }
    }
}

/// Daily schedule for the auto mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local wall-clock time, `HH:MM`.
    pub daily_at: String,

    /// Offset of the local time zone from UTC, in hours.
    pub utc_offset_hours: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_at: "08:01".to_string(),
            utc_offset_hours: 8,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format.
    pub log_format: LogFormat,

    /// Serve Prometheus metrics. Mostly useful in `auto` mode.
    pub metrics_enabled: bool,

    /// Metrics listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let site = SiteConfig::default();
        assert_eq!(site.csrf_url(), "https://camphaven.xyz/api/auth/csrf");
        assert_eq!(
            site.credentials_url(),
            "https://camphaven.xyz/api/auth/callback/credentials"
        );
        assert_eq!(site.session_url(), "https://camphaven.xyz/api/auth/session");
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let site = SiteConfig {
            api_url: "http://127.0.0.1:3000/api/".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(site.csrf_url(), "http://127.0.0.1:3000/api/auth/csrf");
    }

    #[test]
    fn test_delay_sample_within_bounds() {
        let range = DelayRange::new(5_000, 10_000);
        for _ in 0..1_000 {
            let d = range.sample().as_millis() as u64;
            assert!((5_000..=10_000).contains(&d), "sample {} out of range", d);
        }
    }

    #[test]
    fn test_degenerate_delay_range() {
        assert_eq!(DelayRange::new(0, 0).sample(), Duration::ZERO);
        assert_eq!(DelayRange::new(250, 250).sample(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [delays]
            between_wallets = { min_ms = 100, max_ms = 200 }

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.delays.between_wallets, DelayRange::new(100, 200));
        assert_eq!(config.delays.after_login, DelayRange::new(2_000, 4_000));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.sign_in.chain_id, 1);
        assert_eq!(config.browser.navigation_timeout_secs, 60);
    }
}
