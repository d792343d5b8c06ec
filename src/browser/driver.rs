//! Driver boundary between the session state machine and a browser engine.
//!
//! The session only ever asks a page to navigate, to run one
//! [`PageRequest`], or to release itself. Keeping the surface this narrow is
//! what lets the handshake be exercised against scripted pages in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::browser::script::{PageRequest, PageResponse};
use crate::browser::types::SessionResult;
use crate::config::BrowserConfig;

/// A live page inside an isolated browser instance.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Load `url` and wait for the page to settle, bounded by `timeout`.
    ///
    /// Fails with `SessionError::NavigationTimeout` when the bound is hit.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> SessionResult<()>;

    /// Execute `request` from within the page's execution context.
    ///
    /// In-page fetch failures surface as `SessionError::Transport`.
    async fn request(&self, request: &PageRequest) -> SessionResult<PageResponse>;

    /// Release the page and its browser process.
    async fn release(&mut self) -> SessionResult<()>;
}

/// Starts browser instances, one per session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Page: BrowserPage;

    async fn launch(&self, config: &BrowserConfig) -> SessionResult<Self::Page>;
}
