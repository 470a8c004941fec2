use skudex_core::Platform;
use thiserror::Error;

/// Transport-level failures surfaced by a [`crate::fetch::Fetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}

impl FetchError {
    /// URL the failed request was addressed to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url }
            | FetchError::NotFound { url }
            | FetchError::ConnectionFailed { url, .. }
            | FetchError::Status { url, .. } => url,
        }
    }
}

/// Extraction pipeline failures.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unrecognized {platform} document at {url}: {reason}")]
    Parse {
        platform: Platform,
        url: String,
        reason: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no platform signature matched for {url}")]
    UnsupportedPlatform { url: String },

    #[error("no usable SKU extracted from {url}")]
    MissingSku { url: String },

    #[error("no product links found on {url}")]
    NoProductLinks { url: String },

    #[error("pagination limit reached for {site_root}: exceeded {max_pages} pages")]
    PageLimit { site_root: String, max_pages: usize },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Raised when a raw price string contains no parseable numeric content.
///
/// Callers treat this as a soft failure: the field is left absent rather
/// than the whole record being rejected.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no numeric content in price text \"{raw}\"")]
pub struct PriceParseError {
    pub raw: String,
}
