//! Outreach scripts for a single post URL.
//!
//! Reads the post's title and description, classifies them with the same
//! keyword rules as the lead pipeline, and fills in reply templates for the
//! strongest matching interest.

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use leadfinder_crawler::{Extract, GotoOptions, Navigator};
use leadfinder_shared::{InterestTag, Result};

use crate::classifier::classify;

/// Asks the poster to opt in publicly before any DM.
pub const DM_OPT_IN: &str =
    "If you want early access, reply IN and I’ll DM the link (no links here to avoid spam).";

/// Sent only after the poster has opted in.
pub const DM_TEMPLATE_AFTER_OPT_IN: &str = "Hey — saw your post about parking/weather/fuel. I’m building Trucker Pal (parking status + fills-by + notes + weather alerts). If you want early access, I can send the link. Also: would a $49 founders pass (lifetime premium) be worth it if it saves you time at night?";

// ---------------------------------------------------------------------------
// Page metadata
// ---------------------------------------------------------------------------

/// Title and description of a rendered post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub title: String,
    pub description: String,
}

/// Reads `og:` metadata with `<title>`/`<h1>` and `meta[name=description]` fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageMetaExtractor;

impl Extract for PageMetaExtractor {
    type Output = PageSummary;

    fn extract(&self, doc: &Html, _page_url: &Url) -> PageSummary {
        let og_title = Selector::parse("meta[property='og:title']").unwrap();
        let title_sel = Selector::parse("title").unwrap();
        let h1_sel = Selector::parse("h1").unwrap();
        let og_desc = Selector::parse("meta[property='og:description']").unwrap();
        let meta_desc = Selector::parse("meta[name='description']").unwrap();

        let content = |sel: &Selector| {
            doc.select(sel)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let text = |sel: &Selector| {
            doc.select(sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        PageSummary {
            title: content(&og_title)
                .or_else(|| text(&title_sel))
                .or_else(|| text(&h1_sel))
                .unwrap_or_default(),
            description: content(&og_desc)
                .or_else(|| content(&meta_desc))
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

/// Suggested outreach for one post. Printed as JSON by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutreachScript {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<InterestTag>,
    pub suggested_public_reply: String,
    pub suggested_dm_opt_in: String,
    pub dm_template_after_opt_in: String,
}

/// The interest the public reply leads with: first tag in rule order, else parking.
pub fn pick_hook(tags: &BTreeSet<InterestTag>) -> InterestTag {
    tags.iter().next().copied().unwrap_or(InterestTag::Parking)
}

/// Public reply opener for a hook.
pub fn public_reply(hook: InterestTag) -> &'static str {
    match hook {
        InterestTag::Parking => {
            "Night parking has been brutal. What’s the earliest time you start looking when you know it’s going to be tight? Also: what’s the one thing you wish apps told you before you exit?"
        }
        InterestTag::FuelPrices => {
            "Curious what you use for fuel prices right now (if anything). Do you care more about cheapest along route or just knowing what’s fair in an area?"
        }
        InterestTag::WeighStations => {
            "Do you mostly care about weigh station locations, or open/closed status (and bypass info)? What’s the most reliable source you’ve found?"
        }
        InterestTag::WeatherAlerts => {
            "For weather on the road: what do you actually rely on—radar, wind alerts, road conditions? Anything you wish was easier to see without bouncing between apps?"
        }
    }
}

/// Build the script for a post from its summary.
pub fn build_script(url: &str, summary: PageSummary) -> OutreachScript {
    let tags = classify(&format!("{} {}", summary.title, summary.description));
    let hook = pick_hook(&tags);

    OutreachScript {
        url: url.to_string(),
        title: summary.title,
        description: summary.description,
        tags,
        suggested_public_reply: public_reply(hook).to_string(),
        suggested_dm_opt_in: DM_OPT_IN.to_string(),
        dm_template_after_opt_in: DM_TEMPLATE_AFTER_OPT_IN.to_string(),
    }
}

/// Open a session, read the post at `url`, and build its outreach script.
///
/// The session is closed whether or not navigation succeeds.
#[instrument(skip_all, fields(url = %url))]
pub async fn scripts_for_url(
    url: &Url,
    navigator: &dyn Navigator,
    user_agent: &str,
    opts: &GotoOptions,
) -> Result<OutreachScript> {
    let mut session = navigator.open(user_agent).await?;
    let outcome = session.goto(url, opts).await;
    let closed = session.close().await;

    let page = match outcome {
        Ok(page) => {
            closed?;
            page
        }
        Err(e) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "failed to close browser session after error");
            }
            return Err(e);
        }
    };

    let summary = page.extract(&PageMetaExtractor);
    let script = build_script(url.as_str(), summary);
    info!(tags = script.tags.len(), "built outreach script");
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadfinder_crawler::{FixtureNavigator, RenderedPage};
    use leadfinder_shared::LeadFinderError;

    const POST_URL: &str = "https://www.truckersreport.com/truckingindustryforum/threads/scales.9/";

    fn summary_of(html: &str) -> PageSummary {
        RenderedPage::new(Url::parse(POST_URL).unwrap(), html).extract(&PageMetaExtractor)
    }

    #[test]
    fn og_metadata_wins() {
        let s = summary_of(
            r#"<html><head>
                <title>Forum title</title>
                <meta property="og:title" content=" Scale house closed? ">
                <meta property="og:description" content="Port of entry on I-10">
                <meta name="description" content="generic">
            </head><body><h1>Heading</h1></body></html>"#,
        );
        assert_eq!(s.title, "Scale house closed?");
        assert_eq!(s.description, "Port of entry on I-10");
    }

    #[test]
    fn falls_back_to_title_then_h1() {
        let s = summary_of(
            r#"<html><head><title>Lot full</title><meta name="description" content="again"></head></html>"#,
        );
        assert_eq!(s.title, "Lot full");
        assert_eq!(s.description, "again");

        let s = summary_of("<html><body><h1> Only a heading </h1></body></html>");
        assert_eq!(s.title, "Only a heading");
        assert_eq!(s.description, "");
    }

    #[test]
    fn hook_follows_rule_order() {
        let tags: BTreeSet<_> = [InterestTag::WeatherAlerts, InterestTag::FuelPrices]
            .into_iter()
            .collect();
        assert_eq!(pick_hook(&tags), InterestTag::FuelPrices);
        assert_eq!(pick_hook(&BTreeSet::new()), InterestTag::Parking);
    }

    #[test]
    fn script_uses_hook_reply() {
        let script = build_script(
            POST_URL,
            PageSummary {
                title: "Weigh station bypass".into(),
                description: "Drivewyze".into(),
            },
        );
        assert_eq!(script.tags, [InterestTag::WeighStations].into_iter().collect());
        assert_eq!(script.suggested_public_reply, public_reply(InterestTag::WeighStations));
        assert_eq!(script.suggested_dm_opt_in, DM_OPT_IN);

        let json = serde_json::to_value(&script).unwrap();
        assert_eq!(json["tags"], serde_json::json!(["weigh_stations"]));
        assert!(json.get("dm_template_after_opt_in").is_some());
    }

    #[test]
    fn templates_keep_campaign_wording() {
        assert!(DM_TEMPLATE_AFTER_OPT_IN.starts_with("Hey — saw your post about parking/weather/fuel."));
        assert!(public_reply(InterestTag::WeatherAlerts)
            .contains("what do you actually rely on—radar, wind alerts, road conditions?"));
        assert!(DM_OPT_IN.contains("reply IN"));
    }

    #[test]
    fn untagged_page_defaults_to_parking_reply() {
        let script = build_script(POST_URL, PageSummary::default());
        assert!(script.tags.is_empty());
        assert_eq!(script.suggested_public_reply, public_reply(InterestTag::Parking));
    }

    #[tokio::test]
    async fn scripts_for_url_reads_page_and_closes_session() {
        let nav = FixtureNavigator::new().with_page(
            POST_URL,
            r#"<html><head><meta property="og:title" content="Snow on Donner"></head></html>"#,
        );
        let url = Url::parse(POST_URL).unwrap();

        let script = scripts_for_url(&url, &nav, "ua", &GotoOptions::default())
            .await
            .unwrap();

        assert_eq!(script.title, "Snow on Donner");
        assert_eq!(script.tags, [InterestTag::WeatherAlerts].into_iter().collect());
        assert_eq!(nav.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn navigation_failure_still_closes_session() {
        let nav = FixtureNavigator::new().with_failure(POST_URL);
        let url = Url::parse(POST_URL).unwrap();

        let err = scripts_for_url(&url, &nav, "ua", &GotoOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LeadFinderError::Navigation(_)));
        assert_eq!(nav.sessions_opened(), 1);
        assert_eq!(nav.sessions_closed(), 1);
    }
}
