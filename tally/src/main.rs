use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use tally::logging::init_logging;
use tally::{App, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let log = init_logging(cli.verbose)?;
    tracing::info!(log = %log.path().display(), "tally starting");

    let app = App::new(cli)?;
    Ok(app.run().await)
}
