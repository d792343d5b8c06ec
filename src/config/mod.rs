//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc with the session, account client and runner
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no global config object
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AppConfig, BrowserConfig, CampaignConfig, DelayConfig, DelayRange, LogFormat,
    ObservabilityConfig, ScheduleConfig, SignInConfig, SiteConfig, WalletSourceConfig,
};
