//! Shared utilities for integration tests: a scripted browser driver.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use camphaven_automator::browser::{
    BrowserLauncher, BrowserPage, PageRequest, PageResponse, SessionError, SessionResult,
};
use camphaven_automator::config::{AppConfig, BrowserConfig, DelayRange};

/// Anvil's first three development keys.
#[allow(dead_code)]
pub const KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

/// How one launched page answers.
#[derive(Debug, Clone)]
pub struct MockSite {
    pub navigation_times_out: bool,
    pub csrf_token: Option<String>,
    pub user_id: Option<String>,
    pub token: String,
    /// Full JSON body returned by the GraphQL endpoint.
    pub gql_body: Value,
    pub gql_status: u16,
    pub gql_transport_error: Option<String>,
}

impl Default for MockSite {
    fn default() -> Self {
        Self {
            navigation_times_out: false,
            csrf_token: Some("csrf-nonce-1".to_string()),
            user_id: Some("user-1".to_string()),
            token: "bearer-token-1".to_string(),
            gql_body: json!({ "data": { "daily_checkin": { "id": "record-1" } } }),
            gql_status: 200,
            gql_transport_error: None,
        }
    }
}

#[allow(dead_code)]
impl MockSite {
    pub fn without_csrf() -> Self {
        Self {
            csrf_token: None,
            ..Self::default()
        }
    }

    pub fn without_user() -> Self {
        Self {
            user_id: None,
            ..Self::default()
        }
    }

    pub fn with_gql(body: Value) -> Self {
        Self {
            gql_body: body,
            ..Self::default()
        }
    }

    pub fn with_gql_status(status: u16, body: Value) -> Self {
        Self {
            gql_body: body,
            gql_status: status,
            ..Self::default()
        }
    }
}

/// Observations shared by the launcher and its pages.
#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub releases: AtomicUsize,
    pub requests: Mutex<Vec<PageRequest>>,
}

#[allow(dead_code)]
impl Counters {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose URL ends with `suffix`.
    pub fn requests_to(&self, suffix: &str) -> Vec<PageRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(suffix))
            .collect()
    }

    /// `operationName` of every GraphQL request, in order.
    pub fn gql_operations(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.json_body())
            .filter_map(|b| b["operationName"].as_str().map(str::to_string))
            .collect()
    }
}

/// Launcher handing out scripted pages, one site per launch.
pub struct MockLauncher {
    sites: Mutex<VecDeque<MockSite>>,
    fallback: MockSite,
    pub counters: Arc<Counters>,
}

#[allow(dead_code)]
impl MockLauncher {
    pub fn new(site: MockSite) -> Self {
        Self::sequence(Vec::new(), site)
    }

    /// Pages answer with `sites` in launch order, then with `fallback`.
    pub fn sequence(sites: Vec<MockSite>, fallback: MockSite) -> Self {
        Self {
            sites: Mutex::new(sites.into()),
            fallback,
            counters: Arc::new(Counters::default()),
        }
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    type Page = MockPage;

    async fn launch(&self, _config: &BrowserConfig) -> SessionResult<MockPage> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        let site = self
            .sites
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Ok(MockPage {
            site,
            counters: Arc::clone(&self.counters),
        })
    }
}

pub struct MockPage {
    site: MockSite,
    counters: Arc<Counters>,
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn navigate(&mut self, _url: &str, timeout: Duration) -> SessionResult<()> {
        if self.site.navigation_times_out {
            return Err(SessionError::NavigationTimeout(timeout));
        }
        Ok(())
    }

    async fn request(&self, request: &PageRequest) -> SessionResult<PageResponse> {
        self.counters.requests.lock().unwrap().push(request.clone());

        if request.url.ends_with("/auth/csrf") {
            let body = match &self.site.csrf_token {
                Some(token) => json!({ "csrfToken": token }),
                None => json!({}),
            };
            return Ok(PageResponse::new(200, body));
        }
        if request.url.ends_with("/auth/callback/credentials") {
            return Ok(PageResponse::new(200, json!({ "url": "https://camphaven.xyz/home" })));
        }
        if request.url.ends_with("/auth/session") {
            let body = match &self.site.user_id {
                Some(id) => json!({ "user": { "id": id }, "token": self.site.token }),
                None => json!({}),
            };
            return Ok(PageResponse::new(200, body));
        }
        if let Some(message) = &self.site.gql_transport_error {
            return Err(SessionError::Transport(message.clone()));
        }
        Ok(PageResponse::new(self.site.gql_status, self.site.gql_body.clone()))
    }

    async fn release(&mut self) -> SessionResult<()> {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Default configuration with short pauses.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.delays.between_wallets = DelayRange::new(10, 20);
    config.delays.between_actions = DelayRange::new(0, 0);
    config.delays.after_login = DelayRange::new(0, 0);
    config
}
