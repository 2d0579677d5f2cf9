//! In-memory [`Navigator`] serving canned HTML.
//!
//! Used to replay saved search pages offline and to drive the pipeline in
//! tests without a browser. It records every navigation and whether each
//! session was closed.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use leadfinder_shared::{LeadFinderError, Result};

use crate::engine::{GotoOptions, Navigator, RenderedPage, Session};

#[derive(Debug, Default)]
struct FixtureState {
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    visited: Vec<String>,
    user_agents: Vec<String>,
    opened: usize,
    closed: usize,
}

/// Navigator that answers from a URL → HTML map.
///
/// Navigating to a URL registered with [`FixtureNavigator::with_failure`], or to
/// one with no page, fails like a real navigation error.
#[derive(Debug, Clone, Default)]
pub struct FixtureNavigator {
    state: Arc<Mutex<FixtureState>>,
}

impl FixtureNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.lock().pages.insert(url.into(), html.into());
        self
    }

    /// Fail any navigation to `url`.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.lock().failures.insert(url.into());
        self
    }

    /// URLs navigated to, in order, across all sessions.
    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    /// User agents sessions were opened with.
    pub fn user_agents(&self) -> Vec<String> {
        self.lock().user_agents.clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Navigator for FixtureNavigator {
    async fn open(&self, user_agent: &str) -> Result<Box<dyn Session>> {
        {
            let mut state = self.lock();
            state.opened += 1;
            state.user_agents.push(user_agent.to_string());
        }
        Ok(Box::new(FixtureSession {
            navigator: self.clone(),
        }))
    }
}

struct FixtureSession {
    navigator: FixtureNavigator,
}

#[async_trait]
impl Session for FixtureSession {
    async fn goto(&mut self, url: &Url, _opts: &GotoOptions) -> Result<RenderedPage> {
        let mut state = self.navigator.lock();
        state.visited.push(url.to_string());

        if state.failures.contains(url.as_str()) {
            return Err(LeadFinderError::Navigation(format!(
                "{url}: net::ERR_CONNECTION_RESET"
            )));
        }

        let html = state.pages.get(url.as_str()).cloned().ok_or_else(|| {
            LeadFinderError::Navigation(format!("{url}: net::ERR_NAME_NOT_RESOLVED"))
        })?;

        debug!(%url, len = html.len(), "serving fixture page");
        Ok(RenderedPage::new(url.clone(), html))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.navigator.lock().closed += 1;
        Ok(())
    }
}
