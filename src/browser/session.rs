//! Browser-backed authenticated session.
//!
//! # State Machine
//! ```text
//! Uninitialized → Launching → Authenticating → Ready → Closed
//!                     │              │
//!                     └──────────────┴──→ AuthFailed (browser released)
//! ```
//!
//! Every request, including the GraphQL calls made after login, is issued
//! from inside the page that completed the handshake. The bearer token is
//! passed explicitly on each call since the page does not keep it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::browser::driver::{BrowserLauncher, BrowserPage};
use crate::browser::script::PageRequest;
use crate::browser::types::{Session, SessionError, SessionResult, SessionState};
use crate::config::AppConfig;
use crate::wallet::{build_sign_in_message, Wallet};

/// A GraphQL request unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GqlOperation {
    #[serde(rename = "operationName")]
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
}

impl GqlOperation {
    pub fn new(operation_name: impl Into<String>, query: impl Into<String>, variables: Value) -> Self {
        Self {
            operation_name: operation_name.into(),
            query: query.into(),
            variables,
        }
    }
}

/// Outcome of a GraphQL call that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum GqlReply {
    /// The `data` payload (`Null` when the server sent none).
    Data(Value),
    /// First message of the `errors` list. Not an `Err`: the caller decides
    /// whether the error matters.
    Error(String),
}

impl GqlReply {
    pub fn data(&self) -> Option<&Value> {
        match self {
            GqlReply::Data(v) => Some(v),
            GqlReply::Error(_) => None,
        }
    }
}

/// One wallet's browser session.
pub struct BrowserSession<L: BrowserLauncher> {
    launcher: Arc<L>,
    config: Arc<AppConfig>,
    state: SessionState,
    page: Option<L::Page>,
    session: Option<Session>,
    address: Option<String>,
}

impl<L: BrowserLauncher> BrowserSession<L> {
    pub fn new(launcher: Arc<L>, config: Arc<AppConfig>) -> Self {
        Self {
            launcher,
            config,
            state: SessionState::Uninitialized,
            page: None,
            session: None,
            address: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Captured credentials, present only in `Ready`.
    pub fn session(&self) -> Option<&Session> {
        match self.state {
            SessionState::Ready => self.session.as_ref(),
            _ => None,
        }
    }

    /// User id of the authenticated account.
    pub fn user_id(&self) -> SessionResult<&str> {
        self.session()
            .map(|s| s.user_id.as_str())
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Checksummed wallet address, known once `init` has parsed the key.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Launch the browser and run the sign-in handshake.
    ///
    /// Returns the authenticated user id. On any failure the browser is
    /// released before the error is returned and the session ends in
    /// `AuthFailed`.
    pub async fn init(&mut self, private_key: &str) -> SessionResult<String> {
        if self.state != SessionState::Uninitialized {
            return Err(SessionError::InvalidState(self.state));
        }

        // Reject a malformed key before paying for a browser.
        let wallet = match Wallet::from_private_key(private_key) {
            Ok(wallet) => wallet,
            Err(e) => {
                self.state = SessionState::AuthFailed;
                return Err(e.into());
            }
        };
        let address = wallet.checksum_address();
        self.address = Some(address.clone());

        self.state = SessionState::Launching;
        tracing::debug!(address = %address, "Launching browser");
        let page = match self.launcher.launch(&self.config.browser).await {
            Ok(page) => page,
            Err(e) => {
                self.state = SessionState::AuthFailed;
                return Err(e);
            }
        };
        self.page = Some(page);

        self.state = SessionState::Authenticating;
        match self.handshake(&wallet).await {
            Ok(session) => {
                let user_id = session.user_id.clone();
                tracing::info!(address = %address, user_id = %user_id, "Session established");
                self.session = Some(session);
                self.state = SessionState::Ready;
                Ok(user_id)
            }
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Handshake failed");
                self.release_page().await;
                self.state = SessionState::AuthFailed;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self, wallet: &Wallet) -> SessionResult<Session> {
        let config = Arc::clone(&self.config);
        let site = &config.site;
        let page = self
            .page
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState(SessionState::Authenticating))?;

        page.navigate(&site.base_url, config.browser.navigation_timeout())
            .await?;

        let csrf = page.request(&PageRequest::get(site.csrf_url())).await?;
        let nonce = csrf
            .body
            .get("csrfToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or(SessionError::MissingCsrfToken)?
            .to_string();

        let address = wallet.checksum_address();
        let message = build_sign_in_message(&config.sign_in, &address, &nonce);
        let signature = wallet.sign(&message)?;

        let login = PageRequest::post_form(
            site.credentials_url(),
            [
                ("message", message.as_str()),
                ("redirect", "false"),
                ("signature", signature.as_str()),
                ("csrfToken", nonce.as_str()),
                ("callbackUrl", site.callback_url.as_str()),
            ],
        );
        let callback = page.request(&login).await?;
        tracing::debug!(status = callback.status, "Credentials submitted");

        let session = page.request(&PageRequest::get(site.session_url())).await?;
        parse_session(&session.body)
    }

    /// Execute a GraphQL operation under this session's bearer token.
    pub async fn execute_gql(&self, operation: &GqlOperation) -> SessionResult<GqlReply> {
        let (Some(session), Some(page)) = (self.session(), self.page.as_ref()) else {
            return Err(SessionError::NotAuthenticated);
        };

        let payload = serde_json::to_value(operation)
            .map_err(|e| SessionError::Transport(format!("could not encode operation: {}", e)))?;
        let request = PageRequest::post_json(&self.config.site.gql_url, &payload)
            .header("Authorization", session.bearer());

        let response = page.request(&request).await?;
        tracing::debug!(
            operation = %operation.operation_name,
            status = response.status,
            "GraphQL call completed"
        );

        if let Some(message) = first_error_message(&response.body) {
            return Ok(GqlReply::Error(message));
        }
        // A non-2xx reply without a GraphQL error list is an HTTP failure
        // (expired token, gateway error), not an empty result.
        if !response.is_success() {
            return Err(SessionError::Transport(format!(
                "GraphQL endpoint returned HTTP {}: {}",
                response.status,
                error_summary(&response.body)
            )));
        }
        Ok(GqlReply::Data(
            response.body.get("data").cloned().unwrap_or(Value::Null),
        ))
    }

    /// Release the browser. Safe to call repeatedly and from any state.
    pub async fn close(&mut self) {
        self.release_page().await;
        self.session = None;
        self.state = SessionState::Closed;
    }

    async fn release_page(&mut self) {
        if let Some(mut page) = self.page.take() {
            if let Err(e) = page.release().await {
                tracing::warn!(error = %e, "Browser release reported an error");
            }
        }
    }
}

fn parse_session(body: &Value) -> SessionResult<Session> {
    let user = body
        .get("user")
        .filter(|u| u.is_object())
        .ok_or_else(|| SessionError::AuthenticationFailed("no user in session".to_string()))?;

    let user_id = match user.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(SessionError::AuthenticationFailed(
                "session user has no id".to_string(),
            ))
        }
    };

    let token = body
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SessionError::AuthenticationFailed("no token in session".to_string()))?;

    Ok(Session::new(user_id, token))
}

fn first_error_message(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    let first = errors.first()?;
    Some(
        first
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| first.to_string()),
    )
}

/// Short description of a non-GraphQL error body for transport errors.
fn error_summary(body: &Value) -> String {
    match body {
        Value::Null => "no JSON body".to_string(),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        other => other.to_string(),
    }
}
