//! Metric descriptors and Prometheus rendering
//!
//! The catalog is built once at startup and shared read-only between polls.
//! Every poll renders through its own private registry; nothing is registered
//! with the process-wide default registry.

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, HashMap};

use crate::error::RenderError;

/// Namespace prefix shared by every exported metric
pub const NAMESPACE: &str = "teslawallconnector";

/// Fully qualified metric names
pub mod names {
    // Meta
    pub const UP: &str = "teslawallconnector_up";
    pub const SCRAPE_DURATION: &str = "teslawallconnector_scrape_duration";
    pub const BUILD_INFO: &str = "teslawallconnector_exporter_build_info";

    // Lifetime
    pub const CHARGE_STARTS: &str = "teslawallconnector_charge_starts_total";
    pub const CHARGING_DURATION: &str = "teslawallconnector_charging_duration_seconds";
    pub const ENERGY_DELIVERED: &str = "teslawallconnector_delivered_energy_watt_hours_total";
    pub const UPTIME: &str = "teslawallconnector_uptime_seconds";
    pub const CONTACTOR_CYCLES: &str = "teslawallconnector_contactor_cycles_total";
    pub const CONTACTOR_CYCLES_LOADED: &str = "teslawallconnector_contactor_cycles_loaded_total";
    pub const LIFETIME_ALERTS: &str = "teslawallconnector_lifetime_alerts_total";
    pub const THERMAL_FOLDBACKS: &str = "teslawallconnector_thermal_foldbacks_total";
    pub const CONNECTOR_CYCLES: &str = "teslawallconnector_connector_cycles_total";
    pub const AVG_STARTUP_TEMP: &str = "teslawallconnector_average_startup_temperature_celsius";

    // Version
    pub const INFO: &str = "teslawallconnector_info";

    // Vitals
    pub const VEHICLE_CONNECTED: &str = "teslawallconnector_vehicle_connected";
    pub const CURRENT_ALERTS: &str = "teslawallconnector_current_alerts";
    pub const GRID_HZ: &str = "teslawallconnector_grid_hertz";
    pub const GRID_V: &str = "teslawallconnector_grid_voltage";
    pub const PHASE_CURRENT: &str = "teslawallconnector_phase_current_amps";
    pub const PHASE_VOLTAGE: &str = "teslawallconnector_phase_voltage_volts";
    pub const HANDLE_TEMP: &str = "teslawallconnector_handle_temperature_celsius";
    pub const MCU_TEMP: &str = "teslawallconnector_mcu_temperature_celsius";
    pub const PCBA_TEMP: &str = "teslawallconnector_pcba_temperature_celsius";
    pub const VEHICLE_CURRENT: &str = "teslawallconnector_vehicle_current_amps";
    pub const CONTACTOR_CLOSED: &str = "teslawallconnector_contactor_closed";
    pub const EVSE_STATE: &str = "teslawallconnector_evse_state";
    pub const RELAY_COIL_V: &str = "teslawallconnector_relay_coil_voltage";
    pub const PROX_V: &str = "teslawallconnector_proximity_voltage";
    pub const PILOT_HIGH_V: &str = "teslawallconnector_pilot_high_voltage";
    pub const PILOT_LOW_V: &str = "teslawallconnector_pilot_low_voltage";
    pub const SESSION_ENERGY: &str = "teslawallconnector_session_energy_watt_hours_total";
    /// Exported as a counter, not a gauge: it only grows within a session and
    /// resets when the next session starts.
    pub const SESSION_DURATION: &str = "teslawallconnector_session_duration_seconds";
}

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static description of one metric family
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

const fn gauge_desc(name: &'static str, help: &'static str) -> Descriptor {
    Descriptor { name, help, kind: MetricKind::Gauge }
}

const fn counter_desc(name: &'static str, help: &'static str) -> Descriptor {
    Descriptor { name, help, kind: MetricKind::Counter }
}

const DESCRIPTORS: &[Descriptor] = &[
    gauge_desc(names::UP, "Status of Tesla Wall Connector API calls"),
    gauge_desc(names::SCRAPE_DURATION, "Time of scrapes per collector in seconds"),
    gauge_desc(names::BUILD_INFO, "Build information of the exporter"),
    // Lifetime
    gauge_desc(names::CHARGE_STARTS, "Number of charges started"),
    gauge_desc(names::CHARGING_DURATION, "Total time spent charging"),
    gauge_desc(names::ENERGY_DELIVERED, "Total energy delivered via the Wall Connector"),
    gauge_desc(names::UPTIME, "Uptime of the Wall Connector"),
    gauge_desc(names::CONTACTOR_CYCLES, "Number of contactor cycles"),
    gauge_desc(names::CONTACTOR_CYCLES_LOADED, "Number of contactor cycles under load"),
    gauge_desc(names::LIFETIME_ALERTS, "Number of alerts raised over the device lifetime"),
    gauge_desc(names::THERMAL_FOLDBACKS, "Number of thermal foldbacks"),
    gauge_desc(names::CONNECTOR_CYCLES, "Number of connector plug cycles"),
    gauge_desc(names::AVG_STARTUP_TEMP, "Average temperature at startup"),
    // Version
    gauge_desc(names::INFO, "Version and general info about the Tesla Wall Connector"),
    // Vitals
    gauge_desc(names::VEHICLE_CONNECTED, "Whether or not a vehicle is connected"),
    gauge_desc(names::CURRENT_ALERTS, "How many current alerts are there"),
    gauge_desc(names::GRID_HZ, "Current grid frequency"),
    gauge_desc(names::GRID_V, "Current grid voltage"),
    gauge_desc(names::PHASE_CURRENT, "Current per phase in amps"),
    gauge_desc(names::PHASE_VOLTAGE, "Voltage per phase in volts"),
    gauge_desc(names::HANDLE_TEMP, "Current temperature of the handle"),
    gauge_desc(names::MCU_TEMP, "Current temperature of the main control unit"),
    gauge_desc(names::PCBA_TEMP, "Current temperature of the PCBA"),
    gauge_desc(names::VEHICLE_CURRENT, "Amps drawn by the connected vehicle"),
    gauge_desc(names::CONTACTOR_CLOSED, "Whether or not the contactor is closed"),
    gauge_desc(names::EVSE_STATE, "Raw EVSE state code reported by the device"),
    gauge_desc(names::RELAY_COIL_V, "Relay coil voltage"),
    gauge_desc(names::PROX_V, "Proximity pin voltage"),
    gauge_desc(names::PILOT_HIGH_V, "Control pilot high voltage"),
    gauge_desc(names::PILOT_LOW_V, "Control pilot low voltage"),
    counter_desc(names::SESSION_ENERGY, "Energy delivered in the current charge session"),
    counter_desc(names::SESSION_DURATION, "Charge session duration in seconds"),
];

/// One value to publish for this poll
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: &'static str,
    pub kind: MetricKind,
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Observation {
    pub fn gauge(name: &'static str, value: f64) -> Self {
        Self { name, kind: MetricKind::Gauge, labels: Vec::new(), value }
    }

    pub fn counter(name: &'static str, value: f64) -> Self {
        Self { name, kind: MetricKind::Counter, labels: Vec::new(), value }
    }

    pub fn with_label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((key, value.into()));
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Label values in the order of `names`; missing labels are empty
    fn label_values<'a>(&'a self, names: &[&str]) -> Vec<&'a str> {
        names.iter().map(|name| self.label(name).unwrap_or("")).collect()
    }
}

/// Registry of metric descriptors plus static labels
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    descriptors: Vec<Descriptor>,
    global_labels: HashMap<String, String>,
}

impl MetricCatalog {
    /// Build the catalog with static labels added to every series
    pub fn new(global_labels: &BTreeMap<String, String>) -> Self {
        Self {
            descriptors: DESCRIPTORS.to_vec(),
            global_labels: global_labels.clone().into_iter().collect(),
        }
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Render observations in the Prometheus text exposition format
    ///
    /// Families without an observation are left out. Observations whose name
    /// is not in the catalog are dropped.
    pub fn render(&self, observations: &[Observation]) -> Result<String, RenderError> {
        let registry = Registry::new_custom(None, Some(self.global_labels.clone()))?;

        for descriptor in &self.descriptors {
            let family: Vec<&Observation> = observations
                .iter()
                .filter(|o| o.name == descriptor.name)
                .collect();
            let Some(first) = family.first() else {
                continue;
            };
            let label_names: Vec<&str> = first.labels.iter().map(|(k, _)| *k).collect();
            let opts = Opts::new(descriptor.name, descriptor.help);

            match descriptor.kind {
                MetricKind::Gauge => {
                    let vec = GaugeVec::new(opts, &label_names)?;
                    for observation in &family {
                        let values = observation.label_values(&label_names);
                        vec.get_metric_with_label_values(&values)?.set(observation.value);
                    }
                    registry.register(Box::new(vec))?;
                }
                MetricKind::Counter => {
                    let vec = CounterVec::new(opts, &label_names)?;
                    for observation in &family {
                        let values = observation.label_values(&label_names);
                        // A fresh counter starts at zero and must never go down
                        vec.get_metric_with_label_values(&values)?
                            .inc_by(observation.value.max(0.0));
                    }
                    registry.register(Box::new(vec))?;
                }
            }
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}
