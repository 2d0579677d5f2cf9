//! Application configuration for LeadFinder.
//!
//! User config lives at `~/.leadfinder/leadfinder.toml`.
//! CLI flags override config file values, which override defaults.
//! The per-campaign leads file (`leads.json`) carries the search queries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadFinderError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadfinder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadfinder";

/// Desktop Chrome user agent presented by the browser session.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Per-query result cap applied before classification.
pub const DEFAULT_LIMIT_PER_QUERY: usize = 12;

/// Navigation timeout for every page load.
pub const DEFAULT_NAV_TIMEOUT_SECS: u64 = 45;

// ---------------------------------------------------------------------------
// Config structs (matching leadfinder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Browser session settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory the JSON/CSV outputs are written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Maximum leads kept per query.
    #[serde(default = "default_limit_per_query")]
    pub limit_per_query: usize,

    /// Leads file read by `find`.
    #[serde(default = "default_leads_file")]
    pub leads_file: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            limit_per_query: default_limit_per_query(),
            leads_file: default_leads_file(),
        }
    }
}

fn default_out_dir() -> String {
    "out".into()
}
fn default_limit_per_query() -> usize {
    DEFAULT_LIMIT_PER_QUERY
}
fn default_leads_file() -> String {
    "leads.json".into()
}

/// `[browser]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Show the browser window instead of running headless.
    #[serde(default)]
    pub headful: bool,

    /// User agent for the browser session.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-navigation timeout in seconds.
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headful: false,
            user_agent: default_user_agent(),
            nav_timeout_secs: default_nav_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_nav_timeout() -> u64 {
    DEFAULT_NAV_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// Leads file
// ---------------------------------------------------------------------------

/// The `leads.json` campaign file.
///
/// Only `queries` drives the pipeline; the other fields belong to the outreach
/// side and are carried through untouched, whatever their shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadsFile {
    /// Search queries, e.g. `site:reddit.com/r/Trucking parking full`.
    #[serde(default)]
    pub queries: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communities: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<serde_json::Value>,
}

impl LeadsFile {
    /// Read and parse a leads file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LeadFinderError::io(path, e))?;

        serde_json::from_str(&content).map_err(|e| {
            LeadFinderError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Starter campaign written by `leadfinder init`.
    pub fn template() -> Self {
        Self {
            queries: vec![
                "site:reddit.com/r/Trucking parking full".into(),
                "site:reddit.com/r/Truckers weigh station open".into(),
                "site:truckersreport.com truck parking app".into(),
            ],
            communities: vec![
                serde_json::json!({
                    "name": "r/Trucking",
                    "type": "reddit",
                    "url": "https://www.reddit.com/r/Trucking/",
                }),
                serde_json::json!({
                    "name": "TruckersReport",
                    "type": "forum",
                    "url": "https://www.truckersreport.com/truckingindustryforum/",
                }),
            ],
            offer: Some(serde_json::json!({ "kind": "founders_pass", "priceUsd": 49 })),
            hooks: vec!["parking".into(), "weather_alerts".into(), "fills_by".into()],
            notes: Some("Paste thread URLs here and generate outreach scripts.".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadfinder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadFinderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadfinder/leadfinder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadFinderError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LeadFinderError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadFinderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadFinderError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadFinderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("out_dir"));
        assert!(toml_str.contains("nav_timeout_secs = 45"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.limit_per_query, 12);
        assert_eq!(parsed.browser.user_agent, DEFAULT_USER_AGENT);
        assert!(!parsed.browser.headful);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
out_dir = "/tmp/leads"

[browser]
headful = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.out_dir, "/tmp/leads");
        assert_eq!(config.defaults.limit_per_query, 12);
        assert!(config.browser.headful);
        assert_eq!(config.browser.nav_timeout_secs, 45);
    }

    #[test]
    fn leads_file_passes_through_extra_fields() {
        let json = r#"{
            "queries": ["site:truckersreport.com parking"],
            "offer": { "kind": "founders_pass", "priceUsd": 49 },
            "hooks": ["parking"]
        }"#;
        let leads: LeadsFile = serde_json::from_str(json).expect("parse");
        assert_eq!(leads.queries.len(), 1);
        assert_eq!(leads.offer.as_ref().unwrap()["priceUsd"], 49);
        assert!(leads.communities.is_empty());
    }

    #[test]
    fn leads_file_accepts_any_shape_in_unused_fields() {
        let json = r#"{
            "queries": ["site:reddit.com/r/Trucking parking full"],
            "hooks": [{ "name": "parking", "weight": 2 }, "fuel"],
            "communities": [{ "name": "r/Truckers" }],
            "notes": { "owner": "ops", "lines": ["a", "b"] }
        }"#;
        let leads: LeadsFile = serde_json::from_str(json).expect("parse");
        assert_eq!(leads.queries, vec!["site:reddit.com/r/Trucking parking full"]);
        assert_eq!(leads.hooks[0]["name"], "parking");
        assert_eq!(leads.hooks[1], "fuel");
        assert!(leads.communities[0].get("url").is_none());
        assert_eq!(leads.notes.as_ref().unwrap()["owner"], "ops");

        let round_trip = serde_json::to_value(&leads).expect("serialize");
        assert_eq!(round_trip["hooks"][0]["weight"], 2);
    }

    #[test]
    fn leads_file_without_queries_parses_empty() {
        let leads: LeadsFile = serde_json::from_str("{}").expect("parse");
        assert!(leads.queries.is_empty());
    }

    #[test]
    fn leads_file_load_reports_bad_json() {
        let dir = std::env::temp_dir().join(format!("lf-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("leads.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LeadsFile::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn template_queries_are_routable_shapes() {
        let template = LeadsFile::template();
        assert!(template.queries.iter().all(|q| q.starts_with("site:")));
        assert_eq!(template.communities.len(), 2);
        assert_eq!(template.communities[0]["type"], "reddit");
    }
}
