//! Error types for device scrapes and metric rendering

use thiserror::Error;

/// Why a single endpoint scrape failed
///
/// Every variant is reported the same way downstream: the endpoint is down
/// for this poll.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Classify a transport error, separating timeouts out
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }

    pub(crate) fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Body(err)
        }
    }
}

/// Failure to turn a poll's observations into exposition text
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build metric family: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("rendered metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Why a metrics request could not be answered at all
///
/// Endpoint failures are not reported here; they surface as up = 0.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
