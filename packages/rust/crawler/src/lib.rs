//! Query routing, browser navigation, and source adapters.
//!
//! This crate provides:
//! - [`router`]: Classifies a configured query by source (`site:` prefix)
//! - [`engine`]: The navigation capability ([`Navigator`], [`Session`]) and its Chromium backend
//! - [`adapters`]: Per-source search adapters (Reddit, TruckersReport)
//! - [`fixture`]: A canned-HTML navigator for offline replay

pub mod adapters;
pub mod engine;
pub mod fixture;
pub mod router;

pub use adapters::{
    RedditAdapter, RedditResults, SourceAdapter, TruckersReportAdapter, XenForoResults,
    adapter_for,
};
pub use engine::{
    ChromiumNavigator, Extract, GotoOptions, Navigator, RenderedPage, Session,
};
pub use fixture::FixtureNavigator;
pub use router::{ParsedQuery, SourceKind, TRUCKERSREPORT_MARKER, route};
