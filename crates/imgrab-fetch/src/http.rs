use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream of response body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// The minimal interface the fetcher needs: one text GET for the page and one
/// streaming GET per image. Implementations handle their own timeout and
/// redirect configuration and must treat a non-2xx status as an error, so
/// callers never see an "ok" response that carries an error page.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + 'static;

    /// GET a URL and return the response body as text.
    fn get_text(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Open a streaming GET and return the response body as a byte stream.
    ///
    /// The stream is only returned after response headers have been received
    /// and the status validated, so a caller may safely create its output
    /// file once this resolves.
    fn get_stream(
        &self,
        url: &str,
    ) -> impl Future<
        Output = Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error>,
    > + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;

    use super::*;
    use crate::error::FetchError;

    /// Identify as a desktop browser; plenty of sites serve image-less markup
    /// to unknown agents.
    pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Configuration for the production HTTP client.
    ///
    /// One timeout covers both the page request and every image request.
    #[derive(Clone, Debug)]
    pub struct ClientConfig {
        pub timeout: Duration,
        pub user_agent: String,
    }

    impl Default for ClientConfig {
        fn default() -> Self {
            Self {
                timeout: Duration::from_secs(10),
                user_agent: DESKTOP_USER_AGENT.to_string(),
            }
        }
    }

    impl ClientConfig {
        pub fn build(self) -> Result<ReqwestClient, FetchError> {
            let client = reqwest::Client::builder()
                .timeout(self.timeout)
                .user_agent(self.user_agent)
                .build()
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(ReqwestClient { client })
        }
    }

    /// Production HTTP client implementation using reqwest.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, FetchError> {
            ClientConfig::default().build()
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get_text(&self, url: &str) -> Result<String, Self::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.text().await
        }

        async fn get_stream(
            &self,
            url: &str,
        ) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let stream = response.bytes_stream().map(|chunk| chunk.map(Bytes::from));
            Ok(Box::pin(stream))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientConfig, DESKTOP_USER_AGENT, ReqwestClient};
