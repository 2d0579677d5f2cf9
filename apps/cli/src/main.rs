//! LeadFinder CLI: forum lead discovery and outreach scripts.
//!
//! Runs configured forum searches in a headless browser, tags each result by
//! interest, and writes deduplicated leads as JSON and CSV.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
