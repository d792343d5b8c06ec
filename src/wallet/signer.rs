//! Key handling and personal-message signing.
//!
//! # Security
//! - Keys are never logged or serialized
//! - Only the derived address leaves this module

use alloy::primitives::{Address, Signature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::wallet::types::{WalletError, WalletResult};

/// A wallet identity derived from one private key.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> WalletResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{}", e)))?;

        Ok(Self { signer })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// EIP-55 checksummed address, as rendered in the sign-in message.
    pub fn checksum_address(&self) -> String {
        self.address().to_checksum(None)
    }

    /// Sign `message` with the Ethereum personal-message prefix.
    ///
    /// Signing is deterministic (RFC 6979), so the same key and message
    /// always produce the same signature. Returns 0x-prefixed hex of the
    /// 65-byte `r || s || v` signature.
    pub fn sign(&self, message: &str) -> WalletResult<String> {
        let signature = self
            .signer
            .sign_message_sync(message.as_bytes())
            .map_err(|e| WalletError::Signing(format!("{}", e)))?;
        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }
}

/// Derive the checksummed address for a private key.
pub fn derive_address(private_key_hex: &str) -> WalletResult<String> {
    Wallet::from_private_key(private_key_hex).map(|w| w.checksum_address())
}

/// Recover the signer address of a personal-message signature.
pub fn recover_address(message: &str, signature_hex: &str) -> WalletResult<Address> {
    let bytes = alloy::hex::decode(signature_hex)
        .map_err(|e| WalletError::Signing(format!("signature is not hex: {}", e)))?;
    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| WalletError::Signing(format!("malformed signature: {}", e)))?;
    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| WalletError::Signing(format!("recovery failed: {}", e)))
}
