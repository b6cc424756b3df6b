use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::cli::app::{App, Commands};

mod cli;
mod logging;
mod pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();
    let log = logging::init()?;
    debug!("writing log to {}", log.path.display());

    match app.cmd {
        Commands::Grab(args) => cli::grab::run(args).await,
        Commands::Batch(args) => cli::batch::run(args).await,
    }
}
