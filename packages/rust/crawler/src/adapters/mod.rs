//! Source adapter trait and built-in adapters.
//!
//! An adapter turns a routed query into a search URL, navigates there through
//! the shared [`Session`], and extracts raw result rows from the rendered page.

mod reddit;
mod truckersreport;

use async_trait::async_trait;
use scraper::ElementRef;
use tracing::debug;
use url::Url;

use leadfinder_shared::{RawResultItem, Result};

use crate::engine::{GotoOptions, Session};
use crate::router::ParsedQuery;

pub use reddit::{RedditAdapter, RedditResults};
pub use truckersreport::{TruckersReportAdapter, XenForoResults};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Source-specific search over a navigation session.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable adapter name for tracing.
    fn name(&self) -> &str;

    /// The search page to navigate to.
    fn search_url(&self) -> Result<Url>;

    /// Navigate to the search page and extract its result rows.
    ///
    /// Navigation failures are returned as-is; rows without a title or link
    /// are dropped.
    async fn search(
        &self,
        session: &mut dyn Session,
        opts: &GotoOptions,
    ) -> Result<Vec<RawResultItem>>;
}

/// Pick the adapter for a routed query. `None` for unrecognized queries.
pub fn adapter_for(parsed: &ParsedQuery) -> Option<Box<dyn SourceAdapter>> {
    match parsed {
        ParsedQuery::Reddit { subreddit, terms } => {
            Some(Box::new(RedditAdapter::new(subreddit, terms)))
        }
        ParsedQuery::TruckersReport { terms } => Some(Box::new(TruckersReportAdapter::new(terms))),
        ParsedQuery::Unrecognized => None,
    }
}

// ---------------------------------------------------------------------------
// Shared extraction helpers
// ---------------------------------------------------------------------------

/// Trimmed text content of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Resolve a link against the page it came from. Falls back to the raw value.
/// An empty `href` stays empty.
pub(crate) fn resolve_href(page_url: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    page_url
        .join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Build a row, dropping it if the title or link is missing.
pub(crate) fn result_row(title: String, url: String, snippet: String) -> Option<RawResultItem> {
    if title.is_empty() || url.is_empty() {
        debug!(%title, %url, "dropping result row without title or link");
        return None;
    }
    Some(RawResultItem {
        title,
        url,
        snippet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::route;

    #[test]
    fn adapter_selection_follows_route() {
        let reddit = adapter_for(&route("site:reddit.com/r/Trucking parking full")).unwrap();
        assert_eq!(reddit.name(), "reddit");

        let tr = adapter_for(&route("site:truckersreport.com fuel")).unwrap();
        assert_eq!(tr.name(), "truckersreport");

        assert!(adapter_for(&route("diesel prices app")).is_none());
    }

    #[test]
    fn resolve_href_handles_relative_and_absolute() {
        let base = Url::parse("https://www.truckersreport.com/truckingindustryforum/search/1/").unwrap();
        assert_eq!(
            resolve_href(&base, "/truckingindustryforum/threads/parking.123/"),
            "https://www.truckersreport.com/truckingindustryforum/threads/parking.123/"
        );
        assert_eq!(
            resolve_href(&base, "https://old.reddit.com/r/Trucking/comments/x/"),
            "https://old.reddit.com/r/Trucking/comments/x/"
        );
        assert_eq!(resolve_href(&base, ""), "");
    }

    #[test]
    fn result_row_requires_title_and_url() {
        assert!(result_row("t".into(), "https://a/".into(), String::new()).is_some());
        assert!(result_row(String::new(), "https://a/".into(), "s".into()).is_none());
        assert!(result_row("t".into(), String::new(), "s".into()).is_none());
    }
}
