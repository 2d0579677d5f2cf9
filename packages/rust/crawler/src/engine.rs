//! Browser navigation capability.
//!
//! Source adapters see the browser only through [`Navigator`] and [`Session`]:
//! navigate to a URL, get back a [`RenderedPage`], and run a typed
//! [`Extract`] over its DOM. [`ChromiumNavigator`] backs this with a headless
//! Chromium driven over CDP.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::EventDomContentEventFired;
use chromiumoxide::Page;
use futures::StreamExt;
use scraper::Html;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use leadfinder_shared::{DEFAULT_NAV_TIMEOUT_SECS, LeadFinderError, Result};

/// Scheme Chromium gives the document it shows for a failed load.
const ERROR_DOCUMENT_SCHEME: &str = "chrome-error:";

// ---------------------------------------------------------------------------
// Navigation options
// ---------------------------------------------------------------------------

/// Options for a single [`Session::goto`] call.
///
/// Navigation always returns once the document has been parsed
/// (`DOMContentLoaded`); late dynamic content may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoOptions {
    /// Upper bound for the whole navigation, including the wait.
    pub timeout: Duration,
}

impl Default for GotoOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_NAV_TIMEOUT_SECS),
        }
    }
}

impl GotoOptions {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderedPage + extraction
// ---------------------------------------------------------------------------

/// The DOM of a page after navigation, serialized as HTML.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL (after redirects).
    pub url: Url,
    /// Rendered document HTML.
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// Run a typed extraction over the parsed document.
    pub fn extract<E: Extract>(&self, extractor: &E) -> E::Output {
        let doc = Html::parse_document(&self.html);
        extractor.extract(&doc, &self.url)
    }
}

/// A typed query over a rendered document.
///
/// `page_url` is the document's URL, for resolving relative links.
pub trait Extract {
    type Output;

    fn extract(&self, doc: &Html, page_url: &Url) -> Self::Output;
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Opens browser sessions.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Start a session presenting the given user agent.
    async fn open(&self, user_agent: &str) -> Result<Box<dyn Session>>;
}

/// A live browser session. Must be closed with [`Session::close`] on every path.
#[async_trait]
pub trait Session: Send {
    /// Navigate and return the rendered page. Fails on timeout or network error.
    async fn goto(&mut self, url: &Url, opts: &GotoOptions) -> Result<RenderedPage>;

    /// Release the session and the browser process behind it.
    async fn close(self: Box<Self>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Chromium implementation
// ---------------------------------------------------------------------------

/// Launches a local Chromium per session via `chromiumoxide`.
#[derive(Debug, Clone)]
pub struct ChromiumNavigator {
    headful: bool,
    request_timeout: Duration,
}

impl Default for ChromiumNavigator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ChromiumNavigator {
    pub fn new(headful: bool) -> Self {
        Self {
            headful,
            request_timeout: Duration::from_secs(DEFAULT_NAV_TIMEOUT_SECS),
        }
    }

    /// CDP command timeout. Keep it at least as long as the navigation timeout,
    /// otherwise commands issued while a slow page loads fail first.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
impl Navigator for ChromiumNavigator {
    #[instrument(skip_all, fields(headful = self.headful))]
    async fn open(&self, user_agent: &str) -> Result<Box<dyn Session>> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox") // Required for containerized environments
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={user_agent}"))
            .request_timeout(self.request_timeout);
        if self.headful {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(|e| {
            LeadFinderError::Navigation(format!("failed to build browser config: {e}"))
        })?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| LeadFinderError::Navigation(format!("failed to launch browser: {e}")))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(shutdown_err) = shutdown(&mut browser, handle).await {
                    warn!(error = %shutdown_err, "failed to release browser after open error");
                }
                return Err(LeadFinderError::Navigation(format!(
                    "failed to open page: {e}"
                )));
            }
        };

        info!("browser session opened");

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler: handle,
        }))
    }
}

/// One browser process with a single reusable tab.
struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

#[async_trait]
impl Session for ChromiumSession {
    #[instrument(skip_all, fields(url = %url))]
    async fn goto(&mut self, url: &Url, opts: &GotoOptions) -> Result<RenderedPage> {
        debug!(timeout_ms = opts.timeout.as_millis(), "navigating");

        let page = &self.page;
        let navigation = async {
            // Subscribe before navigating so the new document's event is not missed.
            let mut dom_ready = page
                .event_listener::<EventDomContentEventFired>()
                .await
                .map_err(|e| LeadFinderError::Navigation(format!("{url}: {e}")))?;

            // `Page.navigate` would be held by chromiumoxide until the `load`
            // event; a script-driven navigation returns immediately.
            page.evaluate(navigation_script(url))
                .await
                .map_err(|e| LeadFinderError::Navigation(format!("{url}: {e}")))?;

            if dom_ready.next().await.is_none() {
                return Err(LeadFinderError::Navigation(format!(
                    "{url}: browser closed during navigation"
                )));
            }

            let document_url: String = page
                .evaluate("document.URL")
                .await
                .map_err(|e| LeadFinderError::Navigation(format!("{url}: {e}")))?
                .into_value()
                .map_err(|e| LeadFinderError::Navigation(format!("{url}: bad document URL: {e}")))?;

            if is_error_document(&document_url) {
                return Err(LeadFinderError::Navigation(format!("{url}: failed to load")));
            }

            let html = page
                .content()
                .await
                .map_err(|e| LeadFinderError::Navigation(format!("{url}: content read failed: {e}")))?;

            let final_url = Url::parse(&document_url).unwrap_or_else(|_| url.clone());
            Ok(RenderedPage::new(final_url, html))
        };

        let rendered = tokio::time::timeout(opts.timeout, navigation)
            .await
            .map_err(|_| {
                LeadFinderError::Navigation(format!(
                    "{url}: timed out after {}s",
                    opts.timeout.as_secs()
                ))
            })??;

        debug!(len = rendered.html.len(), final_url = %rendered.url, "page rendered");
        Ok(rendered)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumSession {
            mut browser,
            page: _,
            handler,
        } = *self;

        let closed = shutdown(&mut browser, handler).await;
        info!("browser session closed");
        closed
    }
}

/// Close the browser, kill it if that fails, reap the process and join the handler task.
async fn shutdown(browser: &mut Browser, handler: JoinHandle<()>) -> Result<()> {
    let closed = match browser.close().await {
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(error = %e, "browser close failed, killing process");
            if let Some(Err(kill_err)) = browser.kill().await {
                warn!(error = %kill_err, "failed to kill browser process");
            }
            Err(LeadFinderError::Navigation(format!("failed to close browser: {e}")))
        }
    };

    if let Err(e) = browser.wait().await {
        warn!(error = %e, "failed to reap browser process");
    }

    if let Err(e) = handler.await {
        warn!(error = %e, "browser handler task ended abnormally");
    }

    closed
}

/// JavaScript that starts a navigation to `url`. The URL is embedded as a JSON
/// string literal.
fn navigation_script(url: &Url) -> String {
    let literal = serde_json::to_string(url.as_str()).unwrap_or_else(|_| "\"about:blank\"".into());
    format!("window.location.href = {literal}; undefined")
}

/// Whether a document URL is Chromium's failed-load page.
fn is_error_document(document_url: &str) -> bool {
    document_url.starts_with(ERROR_DOCUMENT_SCHEME)
}
