//! HTTP scraper for the Wall Connector API
//!
//! One `Scraper` is built per poll; it owns its own client and is dropped
//! once the three endpoint calls have finished.

use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::config::DeviceConfig;
use crate::error::ScrapeError;

use super::records::{Lifetime, Version, Vitals};

/// Device API endpoints scraped on every poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Version,
    Lifetime,
    Vitals,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Version, Endpoint::Lifetime, Endpoint::Vitals];

    /// Relative API path, also used as the `collector` label value
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Version => "/api/1/version",
            Endpoint::Lifetime => "/api/1/lifetime",
            Endpoint::Vitals => "/api/1/vitals",
        }
    }
}

/// Result of one endpoint scrape
///
/// `elapsed` is always present, success or not.
#[derive(Debug)]
pub struct ScrapeOutcome<T> {
    pub endpoint: Endpoint,
    pub elapsed: Duration,
    pub result: Result<T, ScrapeError>,
}

impl<T> ScrapeOutcome<T> {
    pub fn ok(endpoint: Endpoint, elapsed: Duration, record: T) -> Self {
        Self { endpoint, elapsed, result: Ok(record) }
    }

    pub fn failed(endpoint: Endpoint, elapsed: Duration, error: ScrapeError) -> Self {
        Self { endpoint, elapsed, result: Err(error) }
    }

    pub fn is_up(&self) -> bool {
        self.result.is_ok()
    }

    pub fn record(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ScrapeError> {
        self.result.as_ref().err()
    }
}

/// Everything obtained in one poll cycle
#[derive(Debug)]
pub struct PollSnapshot {
    pub version: ScrapeOutcome<Version>,
    pub lifetime: ScrapeOutcome<Lifetime>,
    pub vitals: ScrapeOutcome<Vitals>,
}

impl PollSnapshot {
    /// Per-endpoint status as (endpoint, error if down, elapsed)
    pub fn statuses(&self) -> [(Endpoint, Option<&ScrapeError>, Duration); 3] {
        [
            (self.version.endpoint, self.version.error(), self.version.elapsed),
            (self.lifetime.endpoint, self.lifetime.error(), self.lifetime.elapsed),
            (self.vitals.endpoint, self.vitals.error(), self.vitals.elapsed),
        ]
    }
}

/// Per-poll device scraper
pub struct Scraper {
    client: reqwest::Client,
    base_url: String,
}

impl Scraper {
    /// Create a scraper for the configured device
    pub fn new(config: &DeviceConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Fetch and decode a single endpoint
    #[instrument(skip(self), fields(path = endpoint.path()))]
    pub async fn scrape<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ScrapeOutcome<T> {
        let start = Instant::now();

        let body = match self.fetch(endpoint).await {
            Ok(body) => body,
            Err(e) => return ScrapeOutcome::failed(endpoint, start.elapsed(), e),
        };
        let elapsed = start.elapsed();

        debug!(bytes = body.len(), elapsed_ms = elapsed.as_millis() as u64, "Endpoint fetched");

        match serde_json::from_slice(&body) {
            Ok(record) => ScrapeOutcome::ok(endpoint, elapsed, record),
            Err(e) => ScrapeOutcome::failed(endpoint, elapsed, e.into()),
        }
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Vec<u8>, ScrapeError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(ScrapeError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(ScrapeError::from_body)?;
        Ok(body.to_vec())
    }

    /// Scrape all three endpoints concurrently and wait for every one
    pub async fn scrape_all(&self) -> PollSnapshot {
        let (version, lifetime, vitals) = tokio::join!(
            self.scrape::<Version>(Endpoint::Version),
            self.scrape::<Lifetime>(Endpoint::Lifetime),
            self.scrape::<Vitals>(Endpoint::Vitals),
        );

        PollSnapshot { version, lifetime, vitals }
    }
}
