use clap::{Parser, Subcommand};

use super::batch::BatchArgs;
use super::grab::GrabArgs;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "imgrab",
    version = env!("CARGO_PKG_VERSION"),
    about = "Download every image referenced by a web page",
    long_about = None,
    propagate_version = true
)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "g", name = "grab", about = "Scrape images from one page")]
    Grab(GrabArgs),
    #[command(alias = "b", name = "batch", about = "Scrape every page listed in a file")]
    Batch(BatchArgs),
}
