//! Chromium driver over the DevTools protocol.
//!
//! # Responsibilities
//! - Launch one isolated Chromium per session (own profile directory)
//! - Apply stealth patches before any site script runs
//! - Evaluate rendered in-page requests and decode their replies
//! - Tear down the browser process, CDP handler task and profile on release

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, FrameId, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::browser::driver::{BrowserLauncher, BrowserPage};
use crate::browser::script::{render_request, PageReply, PageRequest, PageResponse};
use crate::browser::types::{SessionError, SessionResult};
use crate::config::BrowserConfig;

/// Switch that stops Blink from advertising `navigator.webdriver`.
const AUTOMATION_SWITCH: &str = "--disable-blink-features=AutomationControlled";

/// Switch that puts Chromium under visible automation control. Never passed.
const ENABLE_AUTOMATION: &str = "--enable-automation";

/// Lifecycle event Chromium emits once a document has had no network
/// activity for 500 ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Launch switches applied to every browser. These replace chromiumoxide's
/// built-in defaults, which include `--enable-automation`.
const BASE_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--enable-features=NetworkService,NetworkServiceInProcess",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-client-side-phishing-detection",
    "--disable-component-extensions-with-background-pages",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--force-color-profile=srgb",
    "--metrics-recording-only",
    "--no-first-run",
    "--password-store=basic",
    "--use-mock-keychain",
    "--lang=en_US",
];

/// Launches headless Chromium instances.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Page = ChromePage;

    async fn launch(&self, config: &BrowserConfig) -> SessionResult<ChromePage> {
        let profile_dir = std::env::temp_dir().join(format!("camphaven-{:016x}", rand::random::<u64>()));
        let chrome_config = build_chrome_config(config, &profile_dir)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler event error");
                }
            }
        });

        let mut chrome = ChromePage {
            browser: Some(browser),
            page: None,
            handler: handler_task,
            profile_dir,
        };

        if let Err(e) = chrome.open_page(&config.user_agent).await {
            if let Err(release_err) = chrome.release().await {
                tracing::warn!(error = %release_err, "Failed to release browser after launch error");
            }
            return Err(e);
        }

        tracing::debug!(headless = config.headless, "Browser launched");
        Ok(chrome)
    }
}

/// One Chromium process with a single stealth-patched page.
pub struct ChromePage {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
}

impl ChromePage {
    async fn open_page(&mut self, user_agent: &str) -> SessionResult<()> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| SessionError::Launch("browser already released".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Launch(format!("could not open page: {}", e)))?;
        page.enable_stealth_mode_with_agent(user_agent)
            .await
            .map_err(|e| SessionError::Launch(format!("could not apply stealth patches: {}", e)))?;

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> SessionResult<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::Transport("page already released".to_string()))
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> SessionResult<()> {
        let page = self.page()?;
        let navigation = async {
            // Subscribe before navigating so no lifecycle event is missed.
            let mut lifecycle = page.event_listener::<EventLifecycleEvent>().await?;
            page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;
            page.goto(url).await?;
            let main_frame = page.mainframe().await?;
            wait_for_network_idle(&mut lifecycle, main_frame.as_ref()).await;
            Ok::<_, CdpError>(())
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(CdpError::Timeout)) | Err(_) => Err(SessionError::NavigationTimeout(timeout)),
            Ok(Err(e)) => Err(SessionError::Transport(format!("navigation to {} failed: {}", url, e))),
        }
    }

    async fn request(&self, request: &PageRequest) -> SessionResult<PageResponse> {
        let page = self.page()?;
        let expression = render_request(request)
            .map_err(|e| SessionError::Transport(format!("could not encode request: {}", e)))?;
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(SessionError::Transport)?;

        let result = page
            .evaluate_expression(params)
            .await
            .map_err(|e| SessionError::Transport(format!("evaluation failed: {}", e)))?;
        let reply: PageReply = result
            .into_value()
            .map_err(|e| SessionError::Transport(format!("unexpected in-page reply: {}", e)))?;

        reply.into_response().map_err(SessionError::Transport)
    }

    async fn release(&mut self) -> SessionResult<()> {
        self.page.take();

        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await;
        if closed.is_err() {
            if let Some(Err(e)) = browser.kill().await {
                tracing::warn!(error = %e, "Failed to kill browser process");
            }
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "Browser process wait failed");
        }
        self.handler.abort();

        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            tracing::debug!(error = %e, dir = %self.profile_dir.display(), "Profile cleanup skipped");
        }

        closed
            .map(|_| ())
            .map_err(|e| SessionError::Transport(format!("browser close failed: {}", e)))
    }
}

/// Translate [`BrowserConfig`] into a Chromium launch configuration.
pub fn build_chrome_config(config: &BrowserConfig, profile_dir: &Path) -> SessionResult<ChromeConfig> {
    let headless = if config.headless {
        HeadlessMode::New
    } else {
        HeadlessMode::False
    };
    let mut builder = ChromeConfig::builder()
        .disable_default_args()
        .args(launch_args(config))
        .headless_mode(headless)
        .no_sandbox()
        .user_data_dir(profile_dir)
        .request_timeout(Duration::from_secs(config.request_timeout_secs))
        .window_size(1366, 768);

    if let Some(path) = resolve_executable(config) {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(SessionError::Launch)
}

/// Command-line switches for one launch: the base set, the stealth switch,
/// then any configured extras. `--enable-automation` is always filtered out.
pub fn launch_args(config: &BrowserConfig) -> Vec<String> {
    BASE_ARGS
        .iter()
        .copied()
        .chain(std::iter::once(AUTOMATION_SWITCH))
        .chain(config.extra_args.iter().map(String::as_str))
        .filter(|arg| *arg != ENABLE_AUTOMATION)
        .map(str::to_string)
        .collect()
}

/// Tracks main-frame lifecycle events until the current document is idle.
#[derive(Debug, Default)]
struct IdleWatch {
    loader: Option<String>,
}

impl IdleWatch {
    /// Feed one event; returns true once the latest document is network idle.
    fn observe(&mut self, name: &str, loader_id: &str) -> bool {
        match name {
            // A new document (navigation or redirect) resets the wait.
            "init" => {
                self.loader = Some(loader_id.to_string());
                false
            }
            NETWORK_IDLE => self.loader.as_deref().map_or(true, |l| l == loader_id),
            _ => false,
        }
    }
}

/// Wait for `networkIdle` on the main frame. Returns early if the event
/// stream ends, leaving the caller's timeout as the upper bound.
async fn wait_for_network_idle(
    events: &mut EventStream<EventLifecycleEvent>,
    main_frame: Option<&FrameId>,
) {
    let mut watch = IdleWatch::default();
    while let Some(event) = events.next().await {
        if main_frame.is_some_and(|frame| *frame != event.frame_id) {
            continue;
        }
        if watch.observe(&event.name, event.loader_id.as_ref()) {
            tracing::debug!("Network idle");
            return;
        }
    }
}

/// Pick the browser binary: the configured path, else the first existing
/// candidate. `None` leaves discovery to chromiumoxide.
pub fn resolve_executable(config: &BrowserConfig) -> Option<PathBuf> {
    if let Some(path) = &config.executable_path {
        return Some(PathBuf::from(path));
    }
    config
        .candidate_paths
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_executable_wins() {
        let config = BrowserConfig {
            executable_path: Some("/opt/chrome/chrome".to_string()),
            ..BrowserConfig::default()
        };
        assert_eq!(resolve_executable(&config), Some(PathBuf::from("/opt/chrome/chrome")));
    }

    #[test]
    fn test_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("chromium");
        std::fs::write(&present, "").unwrap();

        let config = BrowserConfig {
            executable_path: None,
            candidate_paths: vec![
                dir.path().join("google-chrome").display().to_string(),
                present.display().to_string(),
            ],
            ..BrowserConfig::default()
        };
        assert_eq!(resolve_executable(&config), Some(present));
    }

    #[test]
    fn test_no_candidate_found() {
        let config = BrowserConfig {
            executable_path: None,
            candidate_paths: vec!["/nonexistent/chrome".to_string()],
            ..BrowserConfig::default()
        };
        assert_eq!(resolve_executable(&config), None);
    }

    #[test]
    fn test_launch_args_never_enable_automation() {
        let config = BrowserConfig {
            extra_args: vec![ENABLE_AUTOMATION.to_string(), "--mute-audio".to_string()],
            ..BrowserConfig::default()
        };
        let args = launch_args(&config);

        assert!(!args.iter().any(|a| a == ENABLE_AUTOMATION));
        assert!(args.iter().any(|a| a == AUTOMATION_SWITCH));
        assert!(args.iter().any(|a| a == "--no-first-run"));
        assert_eq!(args.last().map(String::as_str), Some("--mute-audio"));
        assert_eq!(args.len(), BASE_ARGS.len() + 2);
    }

    #[test]
    fn test_chrome_config_replaces_default_args() {
        let dir = tempfile::tempdir().unwrap();
        let config = BrowserConfig {
            executable_path: Some("/opt/chrome/chrome".to_string()),
            headless: true,
            ..BrowserConfig::default()
        };
        let rendered = format!("{:?}", build_chrome_config(&config, dir.path()).unwrap());

        assert!(rendered.contains("disable_default_args: true"));
        assert!(rendered.contains("headless: New"));
        assert!(!rendered.contains(ENABLE_AUTOMATION));
        assert!(rendered.contains(AUTOMATION_SWITCH));
    }

    #[test]
    fn test_headed_launch() {
        let dir = tempfile::tempdir().unwrap();
        let config = BrowserConfig {
            executable_path: Some("/opt/chrome/chrome".to_string()),
            headless: false,
            ..BrowserConfig::default()
        };
        let rendered = format!("{:?}", build_chrome_config(&config, dir.path()).unwrap());
        assert!(rendered.contains("headless: False"));
    }

    #[test]
    fn test_idle_waits_for_current_document() {
        let mut watch = IdleWatch::default();
        assert!(!watch.observe("init", "doc-1"));
        assert!(!watch.observe("load", "doc-1"));
        // Redirect to a new document before the first went idle.
        assert!(!watch.observe("init", "doc-2"));
        assert!(!watch.observe(NETWORK_IDLE, "doc-1"));
        assert!(watch.observe(NETWORK_IDLE, "doc-2"));
    }

    #[test]
    fn test_idle_without_init_accepts_first_idle() {
        let mut watch = IdleWatch::default();
        assert!(!watch.observe("networkAlmostIdle", "doc-1"));
        assert!(watch.observe(NETWORK_IDLE, "doc-1"));
    }
}
