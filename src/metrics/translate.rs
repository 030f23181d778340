//! Mapping from device records to metric observations
//!
//! Pure functions: no I/O and no registry access, so the mapping can be
//! checked directly against decoded records.

use crate::device::{Endpoint, Lifetime, PollSnapshot, ScrapeOutcome, Version, Vitals};
use crate::VERSION;

use super::catalog::{names, Observation};

const COLLECTOR: &str = "collector";
const PHASE: &str = "phase";

/// Translate one poll into the full set of observations
///
/// Field metrics appear only for endpoints that decoded; `up` and
/// `scrape_duration` appear for every endpoint.
pub fn translate(snapshot: &PollSnapshot) -> Vec<Observation> {
    let mut out = vec![Observation::gauge(names::BUILD_INFO, 1.0).with_label("version", VERSION)];

    meta(&mut out, &snapshot.lifetime);
    if let Some(lifetime) = snapshot.lifetime.record() {
        out.extend(lifetime_observations(lifetime));
    }

    meta(&mut out, &snapshot.version);
    if let Some(version) = snapshot.version.record() {
        out.push(version_observation(version));
    }

    meta(&mut out, &snapshot.vitals);
    if let Some(vitals) = snapshot.vitals.record() {
        out.extend(vitals_observations(vitals));
    }

    out
}

fn meta<T>(out: &mut Vec<Observation>, outcome: &ScrapeOutcome<T>) {
    let path = outcome.endpoint.path();
    let up = if outcome.is_up() { 1.0 } else { 0.0 };

    out.push(Observation::gauge(names::UP, up).with_label(COLLECTOR, path));
    out.push(
        Observation::gauge(names::SCRAPE_DURATION, outcome.elapsed.as_secs_f64())
            .with_label(COLLECTOR, path),
    );
}

pub fn lifetime_observations(lt: &Lifetime) -> Vec<Observation> {
    vec![
        Observation::gauge(names::CHARGE_STARTS, lt.charge_starts as f64),
        Observation::gauge(names::CHARGING_DURATION, lt.charging_time_s as f64),
        Observation::gauge(names::ENERGY_DELIVERED, lt.energy_wh as f64),
        Observation::gauge(names::UPTIME, lt.uptime_s as f64),
        Observation::gauge(names::CONTACTOR_CYCLES, lt.contactor_cycles as f64),
        Observation::gauge(names::CONTACTOR_CYCLES_LOADED, lt.contactor_cycles_loaded as f64),
        Observation::gauge(names::LIFETIME_ALERTS, lt.alert_count as f64),
        Observation::gauge(names::THERMAL_FOLDBACKS, lt.thermal_foldbacks as f64),
        Observation::gauge(names::CONNECTOR_CYCLES, lt.connector_cycles as f64),
        Observation::gauge(names::AVG_STARTUP_TEMP, lt.avg_startup_temp),
    ]
}

pub fn version_observation(version: &Version) -> Observation {
    Observation::gauge(names::INFO, 1.0)
        .with_label("firmware_version", version.firmware_version.as_str())
        .with_label("part_number", version.part_number.as_str())
        .with_label("serial_number", version.serial_number.as_str())
}

pub fn vitals_observations(v: &Vitals) -> Vec<Observation> {
    vec![
        Observation::gauge(names::VEHICLE_CONNECTED, flag(v.vehicle_connected)),
        Observation::gauge(names::CURRENT_ALERTS, v.current_alerts.len() as f64),
        Observation::gauge(names::GRID_HZ, v.grid_hz),
        Observation::gauge(names::GRID_V, v.grid_v),
        Observation::gauge(names::PHASE_CURRENT, v.current_a_a).with_label(PHASE, "a"),
        Observation::gauge(names::PHASE_CURRENT, v.current_b_a).with_label(PHASE, "b"),
        Observation::gauge(names::PHASE_CURRENT, v.current_c_a).with_label(PHASE, "c"),
        Observation::gauge(names::PHASE_CURRENT, v.current_n_a).with_label(PHASE, "n"),
        Observation::gauge(names::PHASE_VOLTAGE, v.voltage_a_v).with_label(PHASE, "a"),
        Observation::gauge(names::PHASE_VOLTAGE, v.voltage_b_v).with_label(PHASE, "b"),
        Observation::gauge(names::PHASE_VOLTAGE, v.voltage_c_v).with_label(PHASE, "c"),
        Observation::gauge(names::HANDLE_TEMP, v.handle_temp_c),
        Observation::gauge(names::MCU_TEMP, v.mcu_temp_c),
        Observation::gauge(names::PCBA_TEMP, v.pcba_temp_c),
        Observation::gauge(names::VEHICLE_CURRENT, v.vehicle_current_a),
        Observation::gauge(names::CONTACTOR_CLOSED, flag(v.contactor_closed)),
        Observation::gauge(names::EVSE_STATE, v.evse_state as f64),
        Observation::gauge(names::RELAY_COIL_V, v.relay_coil_v),
        Observation::gauge(names::PROX_V, v.prox_v),
        Observation::gauge(names::PILOT_HIGH_V, v.pilot_high_v),
        Observation::gauge(names::PILOT_LOW_V, v.pilot_low_v),
        // Monotonic within a session, reset to zero when the next one starts
        Observation::counter(names::SESSION_ENERGY, v.session_energy_wh),
        Observation::counter(names::SESSION_DURATION, v.session_s as f64),
    ]
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Names of the field metrics owned by an endpoint
pub fn field_metric_names(endpoint: Endpoint) -> &'static [&'static str] {
    match endpoint {
        Endpoint::Version => &[names::INFO],
        Endpoint::Lifetime => &[
            names::CHARGE_STARTS,
            names::CHARGING_DURATION,
            names::ENERGY_DELIVERED,
            names::UPTIME,
            names::CONTACTOR_CYCLES,
            names::CONTACTOR_CYCLES_LOADED,
            names::LIFETIME_ALERTS,
            names::THERMAL_FOLDBACKS,
            names::CONNECTOR_CYCLES,
            names::AVG_STARTUP_TEMP,
        ],
        Endpoint::Vitals => &[
            names::VEHICLE_CONNECTED,
            names::CURRENT_ALERTS,
            names::GRID_HZ,
            names::GRID_V,
            names::PHASE_CURRENT,
            names::PHASE_VOLTAGE,
            names::HANDLE_TEMP,
            names::MCU_TEMP,
            names::PCBA_TEMP,
            names::VEHICLE_CURRENT,
            names::CONTACTOR_CLOSED,
            names::EVSE_STATE,
            names::RELAY_COIL_V,
            names::PROX_V,
            names::PILOT_HIGH_V,
            names::PILOT_LOW_V,
            names::SESSION_ENERGY,
            names::SESSION_DURATION,
        ],
    }
}
