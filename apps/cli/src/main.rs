//! discodigest CLI — podcast "Discoveries" digests.
//!
//! Polls the podcast feed, collects the links from each episode's
//! Discoveries section, and writes one Markdown digest per episode.

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
