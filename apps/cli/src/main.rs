//! herodex CLI: ingest character wiki pages and news into a local database.
//!
//! Each ingestion pass can be run on its own, all four in sequence, or on a
//! daily schedule.

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
