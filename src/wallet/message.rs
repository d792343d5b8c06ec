//! Sign-in message construction.
//!
//! The server re-renders the message from its parsed fields and verifies the
//! signature against that rendering, so every line here must match the
//! Sign-In-With-Ethereum layout exactly.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::SignInConfig;

/// A fully instantiated sign-in message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInMessage {
    pub domain: String,
    pub address: String,
    pub statement: String,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub resources: Vec<String>,
}

impl SignInMessage {
    pub fn new(params: &SignInConfig, address: &str, nonce: &str, issued_at: DateTime<Utc>) -> Self {
        Self {
            domain: params.domain.clone(),
            address: address.to_string(),
            statement: params.statement.clone(),
            uri: params.uri.clone(),
            version: params.version.clone(),
            chain_id: params.chain_id,
            nonce: nonce.to_string(),
            issued_at,
            resources: params.resources.clone(),
        }
    }

    /// `Issued At` value: UTC, millisecond precision, `Z` suffix.
    pub fn issued_at_iso(&self) -> String {
        self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for SignInMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} wants you to sign in with your Ethereum account:", self.domain)?;
        writeln!(f, "{}", self.address)?;
        writeln!(f)?;
        writeln!(f, "{}", self.statement)?;
        writeln!(f)?;
        writeln!(f, "URI: {}", self.uri)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Chain ID: {}", self.chain_id)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Issued At: {}", self.issued_at_iso())?;
        if !self.resources.is_empty() {
            write!(f, "\nResources:")?;
            for resource in &self.resources {
                write!(f, "\n- {}", resource)?;
            }
        }
        Ok(())
    }
}

/// Build the sign-in message for `address`, issued now.
pub fn build_sign_in_message(params: &SignInConfig, address: &str, nonce: &str) -> String {
    build_sign_in_message_at(params, address, nonce, Utc::now())
}

/// Build the sign-in message with an explicit issue time.
pub fn build_sign_in_message_at(
    params: &SignInConfig,
    address: &str,
    nonce: &str,
    issued_at: DateTime<Utc>,
) -> String {
    SignInMessage::new(params, address, nonce, issued_at).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 1, 0).unwrap()
    }

    #[test]
    fn test_exact_template() {
        let message = build_sign_in_message_at(
            &SignInConfig::default(),
            "0xABC0000000000000000000000000000000000123",
            "xyz123",
            fixed_time(),
        );

        let expected = "camphaven.xyz wants you to sign in with your Ethereum account:\n\
                        0xABC0000000000000000000000000000000000123\n\
                        \n\
                        Please sign with your account\n\
                        \n\
                        URI: https://camphaven.xyz\n\
                        Version: 1\n\
                        Chain ID: 1\n\
                        Nonce: xyz123\n\
                        Issued At: 2024-05-01T08:01:00.000Z\n\
                        Resources:\n\
                        - connector://io.rabby";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_issued_at_keeps_milliseconds() {
        let at = Utc.timestamp_millis_opt(1_714_550_460_123).unwrap();
        let msg = SignInMessage::new(&SignInConfig::default(), "0xabc", "n", at);
        assert_eq!(msg.issued_at_iso(), "2024-05-01T08:01:00.123Z");
    }

    #[test]
    fn test_without_resources() {
        let params = SignInConfig {
            resources: Vec::new(),
            ..SignInConfig::default()
        };
        let message = build_sign_in_message_at(&params, "0xabc", "n1", fixed_time());
        assert!(message.ends_with("Issued At: 2024-05-01T08:01:00.000Z"));
        assert!(!message.contains("Resources:"));
    }

    #[test]
    fn test_now_variant_embeds_nonce() {
        let message = build_sign_in_message(&SignInConfig::default(), "0xabc", "nonce-42");
        assert!(message.contains("\nNonce: nonce-42\n"));
        assert!(message.contains("\nIssued At: "));
    }
}
