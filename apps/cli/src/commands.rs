//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use leadfinder_core::outreach::scripts_for_url;
use leadfinder_core::pipeline::{FindLeadsConfig, FindLeadsResult, ProgressReporter, find_leads};
use leadfinder_crawler::{ChromiumNavigator, GotoOptions};
use leadfinder_shared::{AppConfig, LeadsFile, init_config, load_config};
use tracing::info;
use url::Url;

/// CDP command headroom over the navigation timeout.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LeadFinder: find trucking forum posts worth replying to.
#[derive(Parser)]
#[command(
    name = "leadfinder",
    version,
    about = "Search trucking forums for parking, fuel, scale and weather pain points and export them as leads.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run every query in the leads file and write JSON + CSV leads.
    Find {
        /// Leads file (defaults to `leads_file` from config).
        #[arg(short, long)]
        leads: Option<PathBuf>,

        /// Output directory (defaults to `out_dir` from config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Maximum leads kept per query.
        #[arg(long)]
        limit: Option<usize>,

        /// Show the browser window.
        #[arg(long)]
        headful: bool,
    },

    /// Print outreach scripts for a single post URL.
    Scripts {
        /// Post or thread URL.
        url: String,

        /// Show the browser window.
        #[arg(long)]
        headful: bool,
    },

    /// Write a starter leads file.
    Init {
        /// Where to write it (defaults to `leads_file` from config).
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadfinder=info",
        1 => "leadfinder=debug",
        _ => "leadfinder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Find {
            leads,
            out,
            limit,
            headful,
        } => cmd_find(leads, out, limit, headful).await,
        Command::Scripts { url, headful } => cmd_scripts(&url, headful).await,
        Command::Init { path, force } => cmd_init(path, force).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_find(
    leads: Option<PathBuf>,
    out: Option<PathBuf>,
    limit: Option<usize>,
    headful: bool,
) -> Result<()> {
    let config = load_config()?;

    let leads_path = leads.unwrap_or_else(|| PathBuf::from(&config.defaults.leads_file));
    let leads_file = LeadsFile::load(&leads_path)?;

    let mut find_config = FindLeadsConfig::from(&config).with_queries(leads_file.queries);
    if let Some(out) = out {
        find_config.out_dir = out;
    }
    if let Some(limit) = limit {
        find_config.limit_per_query = limit;
    }

    let navigator = chromium_navigator(&config, headful);

    info!(
        leads = %leads_path.display(),
        queries = find_config.queries.len(),
        limit = find_config.limit_per_query,
        "finding leads"
    );

    let reporter = CliProgress::new();
    let result = match find_leads(&find_config, &navigator, &reporter).await {
        Ok(result) => result,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    println!();
    println!("  Leads written!");
    println!("  JSON:  {}", result.json_path.display());
    println!("  CSV:   {}", result.csv_path.display());
    println!("  Count: {}", result.count);
    println!("  Time:  {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_scripts(url: &str, headful: bool) -> Result<()> {
    let config = load_config()?;
    let parsed_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let navigator = chromium_navigator(&config, headful);
    let opts = GotoOptions::with_timeout_secs(config.browser.nav_timeout_secs);

    info!(url, "generating outreach scripts");

    let script = scripts_for_url(&parsed_url, &navigator, &config.browser.user_agent, &opts).await?;
    println!("{}", serde_json::to_string_pretty(&script)?);

    Ok(())
}

/// Chromium navigator whose CDP command timeout outlasts the navigation timeout.
fn chromium_navigator(config: &AppConfig, headful: bool) -> ChromiumNavigator {
    let nav_timeout = Duration::from_secs(config.browser.nav_timeout_secs);
    ChromiumNavigator::new(headful || config.browser.headful)
        .with_request_timeout(nav_timeout + REQUEST_TIMEOUT_MARGIN)
}

async fn cmd_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => PathBuf::from(load_config()?.defaults.leads_file),
    };

    write_leads_template(&path, force)?;
    println!("Leads file written to: {}", path.display());
    Ok(())
}

/// Write [`LeadsFile::template`] to `path`, refusing to clobber unless `force`.
fn write_leads_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(eyre!(
            "'{}' already exists; pass --force to overwrite",
            path.display()
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(&LeadsFile::template())?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), "wrote leads template");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn query_started(&self, query: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Searching [{current}/{total}] {query}"));
    }

    fn query_finished(&self, query: &str, leads: usize) {
        self.spinner.println(format!("  {leads:>3} leads  {query}"));
    }

    fn done(&self, _result: &FindLeadsResult) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("lf-cli-test-{}", uuid::Uuid::now_v7()))
            .join(name)
    }

    #[test]
    fn cli_parses_find_flags() {
        let cli = Cli::try_parse_from([
            "leadfinder", "-v", "find", "--leads", "c.json", "--out", "o", "--limit", "3",
            "--headful",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Find {
                leads,
                out,
                limit,
                headful,
            } => {
                assert_eq!(leads, Some(PathBuf::from("c.json")));
                assert_eq!(out, Some(PathBuf::from("o")));
                assert_eq!(limit, Some(3));
                assert!(headful);
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn cli_parses_scripts() {
        let cli = Cli::try_parse_from(["leadfinder", "scripts", "https://example.com/t/1"]).unwrap();
        assert!(matches!(cli.command, Command::Scripts { ref url, headful: false } if url == "https://example.com/t/1"));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let path = temp_path("leads.json");
        let _ = std::fs::remove_file(&path);

        write_leads_template(&path, false).unwrap();
        let loaded = LeadsFile::load(&path).unwrap();
        assert_eq!(loaded.queries.len(), 3);

        assert!(write_leads_template(&path, false).is_err());
        write_leads_template(&path, true).unwrap();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
