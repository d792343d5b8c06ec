//! Wallet error definitions.

use thiserror::Error;

/// Errors that can occur while handling a wallet identity.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed private key.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Signature could not be produced or parsed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Key source could not be read.
    #[error("Key source error: {0}")]
    KeySource(#[from] std::io::Error),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WalletError::InvalidKey("odd number of digits".to_string());
        assert_eq!(err.to_string(), "Invalid private key: odd number of digits");

        let err = WalletError::Signing("bad input".to_string());
        assert!(err.to_string().starts_with("Signing failed"));
    }
}
