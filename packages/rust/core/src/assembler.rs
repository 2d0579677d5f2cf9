//! Lead assembler.
//!
//! Turns one query's raw result rows into classified [`Lead`] records.

use tracing::debug;

use leadfinder_crawler::{ParsedQuery, TRUCKERSREPORT_MARKER};
use leadfinder_shared::{Lead, RawResultItem};

use crate::classifier::classify;

/// Outreach policy attached to every lead: engage in public before any DM.
pub const RECOMMENDED_NEXT_STEP: &str =
    "Reply publicly first. DM only opt-ins or the OP after engagement (avoid spam/bans).";

/// Source label for leads produced by `query`.
pub fn source_label(query: &str, parsed: &ParsedQuery) -> String {
    match parsed {
        ParsedQuery::Reddit { subreddit, .. } => format!("reddit:r/{subreddit}"),
        _ if query.contains(TRUCKERSREPORT_MARKER) => "truckersreport".to_string(),
        _ => "web".to_string(),
    }
}

/// Build leads from the first `limit_per_query` rows, in adapter order.
pub fn assemble(
    query: &str,
    parsed: &ParsedQuery,
    items: Vec<RawResultItem>,
    limit_per_query: usize,
) -> Vec<Lead> {
    let source = source_label(query, parsed);
    let available = items.len();

    let leads: Vec<Lead> = items
        .into_iter()
        .take(limit_per_query)
        .map(|item| {
            let tags = classify(&format!("{} {}", item.title, item.snippet));
            Lead {
                source: source.clone(),
                query: query.to_string(),
                title: item.title,
                url: item.url,
                snippet: item.snippet,
                tags,
                recommended_next_step: RECOMMENDED_NEXT_STEP.to_string(),
            }
        })
        .collect();

    debug!(%source, available, kept = leads.len(), "assembled leads");
    leads
}
