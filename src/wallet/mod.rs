//! Wallet identity subsystem.
//!
//! # Data Flow
//! ```text
//! wallets.txt / CAMPHAVEN_PRIVATE_KEYS
//!     → keys.rs (load & filter)
//!     → signer.rs (address derivation, personal-message signing)
//!     → message.rs (sign-in message for the server nonce)
//! ```
//!
//! # Security Constraints
//! - Keys live only in process memory
//! - Never log private keys; log addresses at most

pub mod keys;
pub mod message;
pub mod signer;
pub mod types;

pub use keys::load_private_keys;
pub use message::{build_sign_in_message, build_sign_in_message_at, SignInMessage};
pub use signer::{derive_address, recover_address, Wallet};
pub use types::{WalletError, WalletResult};
