//! The single-page flow shared by the `grab` and `batch` commands:
//! fetch page, extract references, fan out downloads, report.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use imgrab_fetch::{
    BatchOptions, BatchSummary, FetchError, Fetcher, HttpClient, Outcome, PostProcess,
    download_all,
};
use imgrab_scrape::extract_image_urls;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use url::Url;

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len}";

/// Scrape one page: fetch it, extract image references, download them all
/// into `dest` under the given worker cap. Returns the aggregate summary;
/// a page with no images is a successful, empty run.
pub async fn scrape_page<C>(
    fetcher: &Arc<Fetcher<C>>,
    page_url: &str,
    dest: &Path,
    optimize: bool,
    concurrency: usize,
) -> Result<BatchSummary>
where
    C: HttpClient + 'static,
{
    info!("fetching {page_url}");
    let body = fetcher.fetch_page(page_url).await?;

    let base = Url::parse(page_url)
        .map_err(|_| FetchError::InvalidUrl(page_url.to_string()))?;
    let refs = extract_image_urls(&body, &base);
    if refs.is_empty() {
        info!("no images found on {page_url}");
        return Ok(BatchSummary::empty(dest));
    }
    info!("found {} images, downloading to {}", refs.len(), dest.display());

    let bar = ProgressBar::new(refs.len() as u64);
    if let Ok(pb_style) = ProgressStyle::with_template(PB_STYLE) {
        bar.set_style(pb_style);
    }

    let reporter = bar.clone();
    let mut options =
        BatchOptions::new(concurrency).on_outcome(Arc::new(move |outcome: &Outcome| {
            match outcome {
                Outcome::Success { .. } => reporter.println(outcome.to_string()),
                Outcome::Failure { .. } => {
                    reporter.println(style(outcome.to_string()).red().to_string())
                }
            }
            reporter.inc(1);
        }));
    if optimize {
        options = options.post_process(optimize_hook());
    }

    let summary = download_all(Arc::clone(fetcher), refs, dest, options).await?;
    bar.finish_and_clear();
    Ok(summary)
}

/// Check the optimize request against the compiled-in capability, once, at
/// startup. Downloads proceed unoptimized when the capability is missing.
pub fn resolve_optimize(requested: bool) -> bool {
    if requested && !imgrab_optimize::available() {
        warn!("optimization requested but image support is not compiled in; keeping originals");
        return false;
    }
    requested
}

fn optimize_hook() -> PostProcess {
    Arc::new(|path| {
        if let Err(e) = imgrab_optimize::optimize_in_place(path) {
            warn!("could not optimize {}: {e}", path.display());
        }
    })
}

pub fn print_summary(summary: &BatchSummary) {
    println!();
    println!("{}", style("Download summary").bold());
    println!("  images found: {}", summary.found);
    println!("  downloaded:   {}", style(summary.succeeded).green());
    if summary.failed > 0 {
        println!("  failed:       {}", style(summary.failed).red());
    } else {
        println!("  failed:       0");
    }
    println!("  saved to:     {}", summary.dest.display());
}
