//! siteqa CLI — retrieval-augmented question answering for one website.
//!
//! Scrapes a site into a raw corpus, cleans it, indexes it into a hosted
//! vector store, and answers questions over the indexed content.

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
