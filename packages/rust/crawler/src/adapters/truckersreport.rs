//! TruckersReport forum search adapter.
//!
//! The forum runs XenForo; its keyword search works without an account.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use leadfinder_shared::{LeadFinderError, RawResultItem, Result};

use super::{SourceAdapter, element_text, resolve_href, result_row};
use crate::engine::{Extract, GotoOptions, Session};

const SEARCH_ENDPOINT: &str = "https://www.truckersreport.com/truckingindustryforum/search/search";

/// Keyword search across the whole forum.
#[derive(Debug, Clone)]
pub struct TruckersReportAdapter {
    terms: String,
}

impl TruckersReportAdapter {
    pub fn new(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for TruckersReportAdapter {
    fn name(&self) -> &str {
        "truckersreport"
    }

    fn search_url(&self) -> Result<Url> {
        Url::parse_with_params(SEARCH_ENDPOINT, &[("keywords", self.terms.as_str())])
            .map_err(|e| LeadFinderError::parse(format!("truckersreport search url: {e}")))
    }

    #[instrument(skip_all, fields(terms = %self.terms))]
    async fn search(
        &self,
        session: &mut dyn Session,
        opts: &GotoOptions,
    ) -> Result<Vec<RawResultItem>> {
        let url = self.search_url()?;
        let page = session.goto(&url, opts).await?;
        let items = page.extract(&XenForoResults);
        debug!(count = items.len(), "extracted truckersreport results");
        Ok(items)
    }
}

/// Extracts `.contentRow` blocks from a XenForo search results page.
#[derive(Debug, Clone, Copy, Default)]
pub struct XenForoResults;

impl Extract for XenForoResults {
    type Output = Vec<RawResultItem>;

    fn extract(&self, doc: &Html, page_url: &Url) -> Vec<RawResultItem> {
        let row_sel = Selector::parse(".contentRow").unwrap();
        let link_sel = Selector::parse("a[href*='/truckingindustryforum/']").unwrap();
        let snippet_sel = Selector::parse(".contentRow-snippet").unwrap();

        doc.select(&row_sel)
            .filter_map(|row| {
                let anchor = row.select(&link_sel).next();
                let title = anchor.map(element_text).unwrap_or_default();
                let href = anchor
                    .and_then(|a| a.value().attr("href"))
                    .map(|h| resolve_href(page_url, h))
                    .unwrap_or_default();
                let snippet = row
                    .select(&snippet_sel)
                    .next()
                    .map(element_text)
                    .unwrap_or_default();

                result_row(title, href, snippet)
            })
            .collect()
    }
}
