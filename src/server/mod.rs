//! Metrics HTTP server
//!
//! Serves the Prometheus endpoint and a small landing page.

mod routes;

pub use routes::{router, serve, shutdown_signal};
