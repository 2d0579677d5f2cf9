//! URL-keyed lead deduplication.

use std::collections::HashSet;

use leadfinder_shared::Lead;

/// Keep the first lead seen for each URL, preserving first-occurrence order.
///
/// Later duplicates are dropped whole; their tags are not merged.
pub fn dedupe(leads: Vec<Lead>) -> Vec<Lead> {
    let mut seen = HashSet::with_capacity(leads.len());
    leads
        .into_iter()
        .filter(|lead| seen.insert(lead.url.clone()))
        .collect()
}
