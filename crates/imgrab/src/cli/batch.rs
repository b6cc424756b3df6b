use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use imgrab_fetch::{Fetcher, ReqwestClient};
use imgrab_scrape::is_valid_url;
use tracing::{error, info};

use crate::pipeline;

#[derive(Args, Clone, Debug)]
pub struct BatchArgs {
    /// File with one page URL per line; blank lines and # comments are ignored
    pub urls_file: PathBuf,

    /// Base output directory; each page gets its own subdirectory
    pub out: PathBuf,

    /// Re-compress downloaded images in place
    #[arg(long)]
    pub optimize: bool,

    /// Process at most this many pages from the file
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum number of concurrent downloads per page
    #[arg(long, default_value_t = 3)]
    pub concurrency: usize,
}

pub async fn run(args: BatchArgs) -> Result<()> {
    let mut urls = read_urls(&args.urls_file)?;
    if urls.is_empty() {
        bail!("no URLs found in {}", args.urls_file.display());
    }
    if let Some(cap) = args.max_pages {
        urls.truncate(cap);
    }

    let optimize = pipeline::resolve_optimize(args.optimize);
    let fetcher = Arc::new(Fetcher::new(ReqwestClient::new()?));

    info!("processing {} pages", urls.len());
    let mut pages_failed = 0usize;
    let mut found = 0usize;
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    // Pages run one after another; a failed page is logged and the rest of
    // the batch continues.
    for (i, url) in urls.iter().enumerate() {
        info!("page {}/{}: {url}", i + 1, urls.len());
        if !is_valid_url(url) {
            error!("skipping invalid URL {url:?}");
            pages_failed += 1;
            continue;
        }

        let dest = args.out.join(page_dir_name(url));
        match pipeline::scrape_page(&fetcher, url, &dest, optimize, args.concurrency).await {
            Ok(summary) => {
                found += summary.found;
                succeeded += summary.succeeded;
                failed += summary.failed;
                info!(
                    "page done: {} downloaded, {} failed",
                    summary.succeeded, summary.failed
                );
            }
            Err(e) => {
                error!("page {url} failed: {e:#}");
                pages_failed += 1;
            }
        }
    }

    println!();
    println!("{}", style("Batch summary").bold());
    println!("  pages processed: {}", urls.len());
    println!("  pages failed:    {pages_failed}");
    println!("  images found:    {found}");
    println!("  downloaded:      {}", style(succeeded).green());
    if failed > 0 {
        println!("  failed:          {}", style(failed).red());
    } else {
        println!("  failed:          0");
    }
    println!("  output root:     {}", args.out.display());

    Ok(())
}

fn read_urls(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Directory name for one page: the URL with its scheme stripped and path
/// separators flattened.
fn page_dir_name(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .replace('/', "_")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn read_urls_skips_blanks_and_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# gallery pages").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "https://a.test/one").unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "  https://a.test/two  ").unwrap();
        writeln!(file, "# trailing comment").unwrap();

        let urls = read_urls(file.path()).unwrap();
        assert_eq!(urls, vec!["https://a.test/one", "https://a.test/two"]);
    }

    #[test]
    fn read_urls_fails_for_missing_file() {
        assert!(read_urls(Path::new("/nonexistent/urls.txt")).is_err());
    }

    #[test]
    fn page_dir_name_flattens_the_url() {
        assert_eq!(page_dir_name("https://a.test/dir/page"), "a.test_dir_page");
        assert_eq!(page_dir_name("http://a.test"), "a.test");
    }
}
