//! Bounded-concurrency orchestration over many download tasks.
//!
//! One [`DownloadTask`] is built per image URL with its positional ordinal;
//! all tasks run under a fixed-size pool of permits, outcomes surface in
//! completion order, and nothing is cancelled once dispatched: a failed task
//! only moves the failure tally, the rest of the batch runs to the end.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::{StreamExt, stream::FuturesUnordered};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::FetchError;
use crate::fetcher::{DownloadTask, Fetcher};
use crate::http::HttpClient;
use crate::name::NameRegistry;

/// Hook run on each completed file before its outcome surfaces, e.g. the
/// image optimizer. Runs on the blocking pool; must never panic the batch.
pub type PostProcess = Arc<dyn Fn(&Path) + Send + Sync>;

/// Callback invoked once per task as it completes, in completion order.
pub type OutcomeHook = Arc<dyn Fn(&Outcome) + Send + Sync>;

/// The result of one download task, produced exactly once per task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The image is on disk under `filename` in the destination directory.
    Success { filename: String },
    /// Nothing was written; `reason` describes the cause.
    Failure { url: String, reason: String },
}

impl Outcome {
    pub fn failure(url: &str, cause: impl fmt::Display) -> Self {
        Self::Failure {
            url: url.to_string(),
            reason: cause.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { filename } => write!(f, "downloaded {filename}"),
            Self::Failure { url, reason } => {
                write!(f, "failed to download {url}: {reason}")
            }
        }
    }
}

/// Configuration for a batch of downloads.
#[derive(Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of concurrent downloads. Zero is treated as one.
    pub max_concurrent: usize,
    /// Per-outcome callback.
    pub on_outcome: Option<OutcomeHook>,
    /// Per-file post-processing hook, run only on success.
    pub post_process: Option<PostProcess>,
}

impl fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("max_concurrent", &self.max_concurrent)
            .field("on_outcome", &self.on_outcome.as_ref().map(|_| ".."))
            .field("post_process", &self.post_process.as_ref().map(|_| ".."))
            .finish()
    }
}

impl BatchOptions {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn on_outcome(mut self, hook: OutcomeHook) -> Self {
        self.on_outcome = Some(hook);
        self
    }

    #[must_use]
    pub fn post_process(mut self, hook: PostProcess) -> Self {
        self.post_process = Some(hook);
        self
    }
}

/// Aggregate result of one batch; `succeeded + failed == found` always.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dest: PathBuf,
}

impl BatchSummary {
    pub fn empty(dest: impl Into<PathBuf>) -> Self {
        Self {
            found: 0,
            succeeded: 0,
            failed: 0,
            dest: dest.into(),
        }
    }
}

/// Download every image URL into `dest` under a bounded worker pool.
///
/// Creates `dest` (including parents) before anything is written; a failure
/// there is fatal to the batch. Individual download failures are not: they
/// are tallied and surfaced through the outcome hook while the remaining
/// tasks run to completion.
pub async fn download_all<C>(
    fetcher: Arc<Fetcher<C>>,
    urls: Vec<String>,
    dest: &Path,
    options: BatchOptions,
) -> Result<BatchSummary, FetchError>
where
    C: HttpClient + 'static,
{
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| FetchError::CreateDir {
            path: dest.to_path_buf(),
            source: e,
        })?;

    let registry = Arc::new(NameRegistry::new(dest));
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
    let mut in_flight = FuturesUnordered::new();

    let found = urls.len();
    for (ordinal, url) in urls.into_iter().enumerate() {
        let task = DownloadTask {
            url: url.clone(),
            dest: dest.to_path_buf(),
            ordinal,
        };
        let fetcher = Arc::clone(&fetcher);
        let registry = Arc::clone(&registry);
        let semaphore = Arc::clone(&semaphore);
        let post_process = options.post_process.clone();

        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire().await.ok();
            let outcome = fetcher.download_image(&task, &registry).await;

            if let (Outcome::Success { filename }, Some(post)) = (&outcome, post_process) {
                let path = task.dest.join(filename);
                if let Err(e) = tokio::task::spawn_blocking(move || post(&path)).await {
                    debug!("post-process hook panicked: {e}");
                }
            }

            outcome
        });

        // A panicked worker counts as a failed task rather than aborting the
        // batch, keeping the outcome count equal to the task count.
        in_flight.push(async move {
            handle
                .await
                .unwrap_or_else(|e| Outcome::failure(&url, format!("worker panicked: {e}")))
        });
    }

    let mut succeeded = 0;
    let mut failed = 0;
    while let Some(outcome) = in_flight.next().await {
        match outcome {
            Outcome::Success { .. } => succeeded += 1,
            Outcome::Failure { .. } => failed += 1,
        }
        if let Some(hook) = &options.on_outcome {
            hook(&outcome);
        }
    }

    Ok(BatchSummary {
        found,
        succeeded,
        failed,
        dest: dest.to_path_buf(),
    })
}
