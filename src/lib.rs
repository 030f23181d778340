//! Wall Connector Exporter - Prometheus metrics for the Tesla Wall Connector
//!
//! This library polls the charger's local JSON API and republishes the
//! readings as Prometheus metrics, one independent poll per scrape.

pub mod config;
pub mod device;
pub mod error;
pub mod metrics;
pub mod server;
pub mod util;

pub use config::Config;
pub use metrics::Exporter;

/// Exporter version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
