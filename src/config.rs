//! Configuration management
//!
//! Handles loading and validating exporter configuration from TOML files
//! and command line overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Static labels attached to every exported series
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Wall Connector connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Device address (host or host:port); required
    #[serde(default)]
    pub address: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL of the device API, without a trailing slash
    ///
    /// A bare host gets `http://` in front; an explicit scheme is kept as is
    /// and checked by [`Config::validate`].
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        }
    }
}

/// Metrics endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Address to bind the metrics HTTP listener
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Path serving the metrics
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            metrics_path: default_metrics_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Values given on the command line, applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device_address: Option<String>,
    pub timeout_ms: Option<u64>,
    pub listen_addr: Option<SocketAddr>,
}

/// Label names the exporter sets on its own series
const RESERVED_LABELS: &[&str] = &[
    "collector",
    "phase",
    "version",
    "firmware_version",
    "part_number",
    "serial_number",
];

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !name.starts_with("__") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Default value functions
fn default_timeout_ms() -> u64 { 1000 }
fn default_listen_addr() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 9851)) }
fn default_metrics_path() -> String { "/metrics".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| "Failed to parse config file")
    }

    /// Build the effective configuration: optional file, then overrides, then validation
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(address) = overrides.device_address {
            self.device.address = address;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.device.timeout_ms = timeout_ms;
        }
        if let Some(listen_addr) = overrides.listen_addr {
            self.web.listen_addr = listen_addr;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.device.address.trim().is_empty() {
            anyhow::bail!("device.address is required");
        }
        // The HTTP client is built without TLS support
        if let Some((scheme, _)) = self.device.address.trim().split_once("://") {
            if !scheme.eq_ignore_ascii_case("http") {
                anyhow::bail!(
                    "device.address scheme {:?} is not supported; the Wall Connector API is plain http",
                    scheme
                );
            }
        }
        if self.device.timeout_ms == 0 {
            anyhow::bail!("device.timeout_ms must be > 0");
        }
        if !self.web.metrics_path.starts_with('/') {
            anyhow::bail!("web.metrics_path must start with '/'");
        }
        if self.web.metrics_path == "/" {
            anyhow::bail!("web.metrics_path must not be the landing page '/'");
        }
        for name in self.labels.keys() {
            if !is_valid_label_name(name) {
                anyhow::bail!("labels: {:?} is not a valid Prometheus label name", name);
            }
            if RESERVED_LABELS.contains(&name.as_str()) {
                anyhow::bail!("labels: {:?} is already set by the exporter", name);
            }
        }
        Ok(())
    }
}
