//! Browser session subsystem.
//!
//! # Data Flow
//! ```text
//! BrowserSession::init(private key)
//!     → driver.rs   (launch page through a BrowserLauncher)
//!     → navigate landing page (bounded by navigation timeout)
//!     → script.rs   (in-page GET csrf, POST credentials, GET session)
//!     → Session { user_id, auth_token }
//!
//! BrowserSession::execute_gql(operation)
//!     → script.rs   (in-page POST with Authorization: Bearer)
//!     → GqlReply::Data | GqlReply::Error
//! ```
//!
//! # Design Decisions
//! - All traffic originates from the page, never from a host HTTP client
//! - The host/page boundary carries serialized values only
//! - The browser is released on every failure path before errors propagate

pub mod chrome;
pub mod driver;
pub mod script;
pub mod session;
pub mod types;

pub use chrome::ChromeLauncher;
pub use driver::{BrowserLauncher, BrowserPage};
pub use script::{PageRequest, PageResponse};
pub use session::{BrowserSession, GqlOperation, GqlReply};
pub use types::{Session, SessionError, SessionResult, SessionState};
