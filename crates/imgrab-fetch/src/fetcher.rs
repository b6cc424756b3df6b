use std::path::PathBuf;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::batch::Outcome;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::name::NameRegistry;

/// One unit of download work: fetch one image URL into one file.
#[derive(Clone, Debug)]
pub struct DownloadTask {
    /// Absolute image URL.
    pub url: String,
    /// Destination directory, shared by all tasks of a batch.
    pub dest: PathBuf,
    /// Position of the URL in the extracted sequence; feeds the synthetic
    /// fallback filename.
    pub ordinal: usize,
}

/// Fetches pages and images through an [`HttpClient`].
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch the target page and return its body as text.
    ///
    /// Transport failures, timeouts and non-2xx statuses all surface as
    /// [`FetchError::Network`]. No retries.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.client
            .get_text(url)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    /// Download one image, streaming it to its reserved filename.
    ///
    /// The output file is created only after response headers have been
    /// validated, and the body streams into a `.part` staging file that is
    /// renamed into place once complete. A failure removes the staging file,
    /// so no truncated or zero-byte output is ever left behind.
    pub async fn download_image(
        &self,
        task: &DownloadTask,
        registry: &NameRegistry,
    ) -> Outcome {
        let filename = registry.reserve(&task.url, task.ordinal);

        let mut stream = match self.client.get_stream(&task.url).await {
            Ok(stream) => stream,
            Err(e) => return Outcome::failure(&task.url, e),
        };

        let final_path = task.dest.join(&filename);
        let staging_path = task.dest.join(format!("{filename}.part"));

        let mut file = match tokio::fs::File::create(&staging_path).await {
            Ok(file) => file,
            Err(e) => return Outcome::failure(&task.url, e),
        };

        while let Some(chunk) = stream.next().await {
            let write = match chunk {
                Ok(chunk) => file.write_all(&chunk).await,
                Err(e) => {
                    drop(file);
                    remove_staging(&staging_path).await;
                    return Outcome::failure(&task.url, e);
                }
            };
            if let Err(e) = write {
                drop(file);
                remove_staging(&staging_path).await;
                return Outcome::failure(&task.url, e);
            }
        }

        if let Err(e) = file.flush().await {
            drop(file);
            remove_staging(&staging_path).await;
            return Outcome::failure(&task.url, e);
        }
        drop(file);

        if let Err(e) = tokio::fs::rename(&staging_path, &final_path).await {
            remove_staging(&staging_path).await;
            return Outcome::failure(&task.url, e);
        }

        debug!("downloaded {} -> {}", task.url, final_path.display());
        Outcome::Success { filename }
    }
}

async fn remove_staging(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("could not remove staging file {}: {e}", path.display());
    }
}
