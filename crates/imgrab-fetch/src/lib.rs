//! Streaming HTTP image download with bounded concurrency.
//!
//! # Architecture
//!
//! - [`http`] - HTTP client abstraction; production impl behind the `reqwest`
//!   feature, mocks for tests
//! - [`name`] - filename derivation and the per-directory reservation table
//! - [`fetcher`] - page fetch and single-image streaming download
//! - [`batch`] - bounded worker-pool orchestration over many downloads
//!
//! # Key properties
//!
//! - **No partial files**: bodies stream to a `.part` staging file that is
//!   renamed into place only once fully written, and removed on failure
//! - **Race-free naming**: filename reservation is serialized through
//!   [`NameRegistry`], so concurrent tasks in one batch can never claim the
//!   same output name
//! - **Mechanism-only**: no retries, no cancellation; the caller decides what
//!   a failed [`Outcome`] means

mod batch;
mod error;
mod fetcher;
mod http;
mod name;

pub use batch::{BatchOptions, BatchSummary, Outcome, OutcomeHook, PostProcess, download_all};
pub use error::FetchError;
pub use fetcher::{DownloadTask, Fetcher};
pub use http::{BoxStream, HttpClient};
pub use name::NameRegistry;

#[cfg(feature = "reqwest")]
pub use http::{ClientConfig, ReqwestClient};
