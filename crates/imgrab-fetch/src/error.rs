//! Error types for imgrab-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport failure, timeout, or non-2xx status. The message carries the
    /// client's description of the cause, including the URL.
    #[error("request failed: {0}")]
    Network(String),

    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
