use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use dialoguer::{Confirm, Input};
use imgrab_fetch::{Fetcher, ReqwestClient};
use imgrab_scrape::is_valid_url;

use crate::pipeline;

#[derive(Args, Clone, Debug)]
pub struct GrabArgs {
    /// Page URL to scrape (prompted for when omitted)
    pub url: Option<String>,

    /// Directory to save images into (prompted for when omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Re-compress downloaded images in place
    #[arg(long)]
    pub optimize: bool,

    /// Maximum number of concurrent downloads
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,
}

pub async fn run(args: GrabArgs) -> Result<()> {
    let interactive = args.url.is_none();

    let url = match args.url {
        Some(url) => url,
        None => Input::new()
            .with_prompt("Page URL")
            .interact_text()
            .context("failed to read page URL")?,
    };
    let url = url.trim().to_string();
    if !is_valid_url(&url) {
        bail!("invalid URL {url:?}: expected an absolute http(s) URL such as https://example.com");
    }

    let out = match args.out {
        Some(out) => out,
        None => {
            let raw: String = Input::new()
                .with_prompt("Save directory")
                .default(".".to_string())
                .interact_text()
                .context("failed to read save directory")?;
            PathBuf::from(raw)
        }
    };

    let optimize = if args.optimize {
        true
    } else if interactive {
        Confirm::new()
            .with_prompt("Optimize downloaded images?")
            .default(false)
            .interact()
            .context("failed to read optimize choice")?
    } else {
        false
    };
    let optimize = pipeline::resolve_optimize(optimize);

    let fetcher = Arc::new(Fetcher::new(ReqwestClient::new()?));
    let summary = pipeline::scrape_page(&fetcher, &url, &out, optimize, args.concurrency).await?;
    pipeline::print_summary(&summary);

    Ok(())
}
