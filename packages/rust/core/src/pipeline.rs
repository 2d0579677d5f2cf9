//! End-to-end `find` pipeline: queries → route → search → assemble → dedupe → emit.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use leadfinder_crawler::{GotoOptions, Navigator, Session, adapter_for, route};
use leadfinder_shared::{
    AppConfig, DEFAULT_LIMIT_PER_QUERY, DEFAULT_NAV_TIMEOUT_SECS, DEFAULT_USER_AGENT, Lead,
    LeadBatch, LeadFinderError, Result,
};

use crate::assembler::assemble;
use crate::dedup::dedupe;
use crate::emitter;

/// Configuration for the `find_leads` pipeline.
#[derive(Debug, Clone)]
pub struct FindLeadsConfig {
    /// Queries to run, in order.
    pub queries: Vec<String>,
    /// Directory the JSON/CSV files are written to.
    pub out_dir: PathBuf,
    /// Maximum leads kept per query.
    pub limit_per_query: usize,
    /// User agent the browser session presents.
    pub user_agent: String,
    /// Per-navigation timeout in seconds.
    pub nav_timeout_secs: u64,
}

impl Default for FindLeadsConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            out_dir: PathBuf::from("out"),
            limit_per_query: DEFAULT_LIMIT_PER_QUERY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            nav_timeout_secs: DEFAULT_NAV_TIMEOUT_SECS,
        }
    }
}

impl From<&AppConfig> for FindLeadsConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            queries: Vec::new(),
            out_dir: PathBuf::from(&config.defaults.out_dir),
            limit_per_query: config.defaults.limit_per_query,
            user_agent: config.browser.user_agent.clone(),
            nav_timeout_secs: config.browser.nav_timeout_secs,
        }
    }
}

impl FindLeadsConfig {
    /// Replace the query list.
    pub fn with_queries(mut self, queries: Vec<String>) -> Self {
        self.queries = queries;
        self
    }
}

/// Result of the `find_leads` pipeline.
#[derive(Debug)]
pub struct FindLeadsResult {
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    /// Number of deduplicated leads written.
    pub count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a query is routed and searched.
    fn query_started(&self, query: &str, current: usize, total: usize);
    /// Called after a query's leads are assembled.
    fn query_finished(&self, query: &str, leads: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &FindLeadsResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn query_started(&self, _query: &str, _current: usize, _total: usize) {}
    fn query_finished(&self, _query: &str, _leads: usize) {}
    fn done(&self, _result: &FindLeadsResult) {}
}

/// Run every configured query and write the deduplicated leads.
///
/// 1. Open one browser session
/// 2. For each query: route, search through its adapter, assemble leads
/// 3. Close the session
/// 4. Dedupe by URL and emit JSON + CSV
///
/// Any navigation failure aborts the run before anything is written. The
/// session is closed on every path.
#[instrument(skip_all, fields(queries = config.queries.len(), out_dir = %config.out_dir.display()))]
pub async fn find_leads(
    config: &FindLeadsConfig,
    navigator: &dyn Navigator,
    progress: &dyn ProgressReporter,
) -> Result<FindLeadsResult> {
    let start = Instant::now();
    let run_id = Uuid::now_v7();

    if config.queries.is_empty() {
        return Err(LeadFinderError::config("no queries configured"));
    }
    if config.limit_per_query == 0 {
        return Err(LeadFinderError::validation(
            "limit_per_query must be at least 1",
        ));
    }

    info!(%run_id, queries = config.queries.len(), "starting find pipeline");

    // --- Phase 1: Session ---
    progress.phase("Opening browser");
    let mut session = navigator.open(&config.user_agent).await?;
    let opts = GotoOptions::with_timeout_secs(config.nav_timeout_secs);

    // --- Phase 2: Search ---
    let outcome = collect_leads(config, session.as_mut(), &opts, progress).await;
    let closed = session.close().await;

    let collected = match outcome {
        Ok(leads) => {
            closed?;
            leads
        }
        Err(e) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "failed to close browser session after error");
            }
            return Err(e);
        }
    };

    // --- Phase 3: Dedupe + emit ---
    progress.phase("Writing output");
    let total = collected.len();
    let leads = dedupe(collected);
    info!(%run_id, total, unique = leads.len(), "deduplicated leads");

    let batch = LeadBatch::new(leads);
    let emitted = emitter::emit(&batch, &config.out_dir)?;

    let result = FindLeadsResult {
        json_path: emitted.json_path,
        csv_path: emitted.csv_path,
        count: emitted.count,
        elapsed: start.elapsed(),
    };

    info!(
        %run_id,
        count = result.count,
        elapsed_ms = result.elapsed.as_millis(),
        "find pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Run the queries sequentially over one session.
async fn collect_leads(
    config: &FindLeadsConfig,
    session: &mut dyn Session,
    opts: &GotoOptions,
    progress: &dyn ProgressReporter,
) -> Result<Vec<Lead>> {
    let total = config.queries.len();
    let mut all = Vec::new();

    for (i, query) in config.queries.iter().enumerate() {
        progress.query_started(query, i + 1, total);

        let parsed = route(query);
        let Some(adapter) = adapter_for(&parsed) else {
            debug!(%query, "unrecognized query, skipping");
            progress.query_finished(query, 0);
            continue;
        };

        let items = adapter.search(session, opts).await?;
        let leads = assemble(query, &parsed, items, config.limit_per_query);

        info!(%query, source = adapter.name(), leads = leads.len(), "query finished");
        progress.query_finished(query, leads.len());
        all.extend(leads);
    }

    Ok(all)
}
