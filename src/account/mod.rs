//! Account operations (check-in, referral, stats) over GraphQL.
//!
//! Each operation is a thin GraphQL call executed through an authenticated
//! [`BrowserSession`](crate::browser::BrowserSession). GraphQL-level errors
//! are reported as outcomes rather than failures; only transport problems
//! and a missing session surface as `Err`.

pub mod client;
pub mod operations;

pub use client::{AccountClient, CheckinOutcome, ReferralOutcome, ReferralStats};
