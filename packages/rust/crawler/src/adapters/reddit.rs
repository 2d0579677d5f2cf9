//! Reddit subreddit search adapter (old.reddit.com markup).

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use leadfinder_shared::{LeadFinderError, RawResultItem, Result};

use super::{SourceAdapter, element_text, resolve_href, result_row};
use crate::engine::{Extract, GotoOptions, Session};

/// Searches one subreddit, newest first, over the past year.
#[derive(Debug, Clone)]
pub struct RedditAdapter {
    subreddit: String,
    terms: String,
}

impl RedditAdapter {
    pub fn new(subreddit: impl Into<String>, terms: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            terms: terms.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn name(&self) -> &str {
        "reddit"
    }

    fn search_url(&self) -> Result<Url> {
        let mut url = Url::parse("https://old.reddit.com/")
            .map_err(|e| LeadFinderError::parse(format!("reddit base url: {e}")))?;

        url.path_segments_mut()
            .map_err(|_| LeadFinderError::parse("reddit base url cannot have a path"))?
            .extend(["r", self.subreddit.as_str(), "search"]);

        url.query_pairs_mut()
            .append_pair("q", &self.terms)
            .append_pair("restrict_sr", "1")
            .append_pair("sort", "new")
            .append_pair("t", "year");

        Ok(url)
    }

    #[instrument(skip_all, fields(subreddit = %self.subreddit, terms = %self.terms))]
    async fn search(
        &self,
        session: &mut dyn Session,
        opts: &GotoOptions,
    ) -> Result<Vec<RawResultItem>> {
        let url = self.search_url()?;
        let page = session.goto(&url, opts).await?;
        let items = page.extract(&RedditResults);
        debug!(count = items.len(), "extracted reddit results");
        Ok(items)
    }
}

/// Extracts `.search-result` rows from an old.reddit.com search page.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedditResults;

impl Extract for RedditResults {
    type Output = Vec<RawResultItem>;

    fn extract(&self, doc: &Html, page_url: &Url) -> Vec<RawResultItem> {
        let row_sel = Selector::parse(".search-result").unwrap();
        let title_sel = Selector::parse("a.search-title").unwrap();
        let body_sel = Selector::parse(".search-result-body").unwrap();
        let header_sel = Selector::parse(".search-result-header").unwrap();

        doc.select(&row_sel)
            .filter_map(|row| {
                let anchor = row.select(&title_sel).next();
                let title = anchor.map(element_text).unwrap_or_default();
                let href = anchor
                    .and_then(|a| a.value().attr("href"))
                    .map(|h| resolve_href(page_url, h))
                    .unwrap_or_default();

                // Posts without a selftext only carry the header block.
                let snippet = row
                    .select(&body_sel)
                    .next()
                    .or_else(|| row.select(&header_sel).next())
                    .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                    .unwrap_or_default();

                result_row(title, href, snippet)
            })
            .collect()
    }
}

/// Trim and fold every whitespace run into a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
