//! Typed views of the Wall Connector JSON payloads
//!
//! Every field is defaulted so that firmware omitting a key decodes to zero,
//! and unknown keys are ignored so that firmware additions never break a poll.

use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// `/api/1/version`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Version {
    pub firmware_version: String,
    pub part_number: String,
    pub serial_number: String,
}

/// `/api/1/lifetime`: cumulative counters since manufacture
///
/// Integers are signed so that an out-of-range reading still decodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Lifetime {
    pub contactor_cycles: i64,
    pub contactor_cycles_loaded: i64,
    pub alert_count: i64,
    pub thermal_foldbacks: i64,
    pub avg_startup_temp: f64,
    pub charge_starts: i64,
    pub energy_wh: i64,
    pub connector_cycles: i64,
    pub uptime_s: i64,
    pub charging_time_s: i64,
}

/// `/api/1/vitals`: live readings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Vitals {
    pub contactor_closed: bool,
    pub vehicle_connected: bool,
    pub session_s: i64,
    pub grid_v: f64,
    pub grid_hz: f64,
    pub vehicle_current_a: f64,
    #[serde(rename = "currentA_a")]
    pub current_a_a: f64,
    #[serde(rename = "currentB_a")]
    pub current_b_a: f64,
    #[serde(rename = "currentC_a")]
    pub current_c_a: f64,
    #[serde(rename = "currentN_a")]
    pub current_n_a: f64,
    #[serde(rename = "voltageA_v")]
    pub voltage_a_v: f64,
    #[serde(rename = "voltageB_v")]
    pub voltage_b_v: f64,
    #[serde(rename = "voltageC_v")]
    pub voltage_c_v: f64,
    pub relay_coil_v: f64,
    pub pcba_temp_c: f64,
    pub handle_temp_c: f64,
    pub mcu_temp_c: f64,
    pub uptime_s: i64,
    pub input_thermopile_uv: i64,
    pub prox_v: f64,
    pub pilot_high_v: f64,
    pub pilot_low_v: f64,
    pub session_energy_wh: f64,
    pub config_status: i64,
    pub evse_state: i64,
    pub current_alerts: AlertCount,
}

/// Number of entries in the `current_alerts` list
///
/// Entries are skipped without being interpreted; `null` counts as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertCount(pub usize);

impl AlertCount {
    pub fn len(&self) -> usize {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl<'de> Deserialize<'de> for AlertCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = AlertCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of alerts or null")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut count = 0;
                while seq.next_element::<IgnoredAny>()?.is_some() {
                    count += 1;
                }
                Ok(AlertCount(count))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(AlertCount(0))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(AlertCount(0))
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}
