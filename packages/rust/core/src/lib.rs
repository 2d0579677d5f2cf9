//! Core pipeline orchestration and domain logic for LeadFinder.
//!
//! This crate ties together routing, source search, classification,
//! deduplication and output into the end-to-end `find_leads` workflow, and
//! builds outreach scripts for single posts.

pub mod assembler;
pub mod classifier;
pub mod dedup;
pub mod emitter;
pub mod outreach;
pub mod pipeline;

pub use emitter::{EmitResult, emit, to_csv};
pub use outreach::{OutreachScript, scripts_for_url};
pub use pipeline::{
    FindLeadsConfig, FindLeadsResult, ProgressReporter, SilentProgress, find_leads,
};
