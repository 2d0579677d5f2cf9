//! Shared types, error model, and configuration for LeadFinder.
//!
//! This crate is the foundation depended on by all other LeadFinder crates.
//! It provides:
//! - [`LeadFinderError`]: the unified error type
//! - Domain types ([`Lead`], [`LeadBatch`], [`RawResultItem`], [`InterestTag`])
//! - Configuration ([`AppConfig`], [`LeadsFile`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BrowserConfig, DEFAULT_LIMIT_PER_QUERY, DEFAULT_NAV_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, DefaultsConfig, LeadsFile, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{LeadFinderError, Result};
pub use types::{InterestTag, Lead, LeadBatch, RawResultItem};
