//! Query routing.
//!
//! A configured query names its source with a `site:` prefix:
//! - `site:reddit.com/r/<subreddit> <terms>`
//! - `site:truckersreport.com <terms>`
//!
//! Anything else routes to [`ParsedQuery::Unrecognized`], which the pipeline
//! treats as a query with zero results.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// `site:reddit.com/r/<community> <terms>`, case-insensitive.
static REDDIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)site:reddit\.com/r/(\S+)\s+(.*)$").expect("reddit query regex")
});

/// `site:truckersreport.com <terms>`, case-insensitive.
static TRUCKERSREPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)site:truckersreport\.com\s+(.*)$").expect("truckersreport query regex")
});

/// Domain marker used for the `truckersreport` source label.
pub const TRUCKERSREPORT_MARKER: &str = "truckersreport.com";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which source a query was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Reddit,
    TruckersReport,
    Unrecognized,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceKind::Reddit => "reddit",
            SourceKind::TruckersReport => "truckersreport",
            SourceKind::Unrecognized => "unrecognized",
        };
        f.write_str(s)
    }
}

/// A query after source routing, carrying the source-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    /// Reddit search restricted to one subreddit.
    Reddit { subreddit: String, terms: String },
    /// TruckersReport forum keyword search.
    TruckersReport { terms: String },
    /// No adapter handles this query.
    Unrecognized,
}

impl ParsedQuery {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            ParsedQuery::Reddit { .. } => SourceKind::Reddit,
            ParsedQuery::TruckersReport { .. } => SourceKind::TruckersReport,
            ParsedQuery::Unrecognized => SourceKind::Unrecognized,
        }
    }

    /// The free-text search terms, if the query was recognized.
    pub fn terms(&self) -> Option<&str> {
        match self {
            ParsedQuery::Reddit { terms, .. } | ParsedQuery::TruckersReport { terms } => {
                Some(terms)
            }
            ParsedQuery::Unrecognized => None,
        }
    }
}

/// Route a raw query string to a source. Reddit is tried first.
pub fn route(query: &str) -> ParsedQuery {
    if let Some(caps) = REDDIT_RE.captures(query) {
        return ParsedQuery::Reddit {
            subreddit: caps[1].to_string(),
            terms: caps[2].to_string(),
        };
    }

    if let Some(caps) = TRUCKERSREPORT_RE.captures(query) {
        return ParsedQuery::TruckersReport {
            terms: caps[1].to_string(),
        };
    }

    ParsedQuery::Unrecognized
}
