//! Prometheus exporter
//!
//! Runs one independent poll of the device per metrics request.

use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{Config, DeviceConfig};
use crate::device::{PollSnapshot, Scraper};
use crate::error::{ExportError, ScrapeError};

use super::catalog::MetricCatalog;
use super::translate::translate;

/// Poll handler shared by all metrics requests
///
/// Holds only read-only configuration; each call to [`Exporter::collect`]
/// builds and discards its own scraper and registry.
#[derive(Debug, Clone)]
pub struct Exporter {
    catalog: MetricCatalog,
    device: DeviceConfig,
}

impl Exporter {
    pub fn new(config: &Config) -> Self {
        Self {
            catalog: MetricCatalog::new(&config.labels),
            device: config.device.clone(),
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Scrape the device once
    pub async fn poll(&self) -> Result<PollSnapshot, ScrapeError> {
        let scraper = Scraper::new(&self.device)?;
        let snapshot = scraper.scrape_all().await;

        for (endpoint, error, elapsed) in snapshot.statuses() {
            if let Some(error) = error {
                warn!(
                    path = endpoint.path(),
                    error = %error,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Failed collection"
                );
            }
        }

        Ok(snapshot)
    }

    /// Poll the device and render the result in the Prometheus text format
    pub async fn collect(&self) -> Result<String, ExportError> {
        let start = Instant::now();
        let snapshot = self.poll().await?;
        let observations = translate(&snapshot);
        let body = self.catalog.render(&observations)?;

        debug!(
            version_up = snapshot.version.is_up(),
            lifetime_up = snapshot.lifetime.is_up(),
            vitals_up = snapshot.vitals.is_up(),
            series = observations.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Poll complete"
        );

        Ok(body)
    }
}
