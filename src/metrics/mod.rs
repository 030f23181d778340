//! Metrics and observability
//!
//! Translation of device records into Prometheus metrics.

mod catalog;
mod exporter;
mod translate;

pub use catalog::{names, Descriptor, MetricCatalog, MetricKind, Observation, NAMESPACE};
pub use exporter::Exporter;
pub use translate::{field_metric_names, translate};
