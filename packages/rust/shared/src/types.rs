//! Core domain types for LeadFinder runs.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// InterestTag
// ---------------------------------------------------------------------------

/// Fixed-vocabulary interest category attached to a lead.
///
/// Declaration order is the classifier's rule-evaluation order, so an ordered
/// set of tags always lists them in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestTag {
    Parking,
    FuelPrices,
    WeighStations,
    WeatherAlerts,
}

impl InterestTag {
    /// All tags, in rule-evaluation order.
    pub const ALL: [InterestTag; 4] = [
        InterestTag::Parking,
        InterestTag::FuelPrices,
        InterestTag::WeighStations,
        InterestTag::WeatherAlerts,
    ];

    /// Wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestTag::Parking => "parking",
            InterestTag::FuelPrices => "fuel_prices",
            InterestTag::WeighStations => "weigh_stations",
            InterestTag::WeatherAlerts => "weather_alerts",
        }
    }
}

impl std::fmt::Display for InterestTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterestTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        InterestTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("unknown interest tag: {s}"))
    }
}

// ---------------------------------------------------------------------------
// RawResultItem
// ---------------------------------------------------------------------------

/// One search result row as extracted from a rendered source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResultItem {
    /// Result title (link text).
    pub title: String,
    /// Absolute link to the post/thread.
    pub url: String,
    /// Body excerpt; may be empty.
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A classified forum/community post relevant to outreach. Keyed by `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Source label, e.g. `reddit:r/Trucking`, `truckersreport` or `web`.
    pub source: String,
    /// The configured query that produced this lead.
    pub query: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Interest tags in rule-evaluation order.
    pub tags: BTreeSet<InterestTag>,
    /// Fixed outreach policy text.
    pub recommended_next_step: String,
}

impl Lead {
    /// Tags joined with `|` for the flattened (CSV) form.
    pub fn tags_joined(&self) -> String {
        self.tags
            .iter()
            .map(InterestTag::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}

// ---------------------------------------------------------------------------
// LeadBatch
// ---------------------------------------------------------------------------

/// All deduplicated leads of one pipeline run. Written as the JSON output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadBatch {
    /// When the batch was emitted.
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    /// Leads with pairwise-distinct URLs, in first-seen order.
    pub leads: Vec<Lead>,
}

impl LeadBatch {
    /// Create a batch stamped with the current time.
    pub fn new(leads: Vec<Lead>) -> Self {
        Self {
            generated_at: Utc::now(),
            leads,
        }
    }
}
