use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;

/// A document retrieved over HTTP.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL after redirects. Extraction resolves relative links
    /// against this, not the URL originally requested.
    pub url: String,
    /// Value of the `Content-Type` response header, if present.
    pub content_type: Option<String>,
    pub body: String,
}

/// Retrieves documents for the extraction pipeline.
///
/// The pipeline itself never constructs HTTP clients or retries; both
/// concerns live behind this trait so tests can substitute canned
/// documents and failures.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

/// Production [`Fetcher`] backed by a shared `reqwest::Client`.
///
/// Handles not-found (404) and other non-2xx responses as typed errors.
/// Transient failures (timeouts, connection errors, 429) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct HttpFetcher {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first failure for
    /// retriable errors. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error if the `reqwest::Client` cannot
    /// be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Redirects may land on a different host or path; record where
        // the body actually came from.
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        Ok(FetchedDocument {
            url: final_url,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_once(url)
        })
        .await
    }
}

/// Maps a `reqwest` transport error onto the fetch error taxonomy.
fn classify_transport_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::ConnectionFailed {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
