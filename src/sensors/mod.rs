//! Sensor data model: the per-tick [`Readings`] snapshot and the
//! battery maths that turns raw voltage/current into percentage and
//! charging status.
//!
//! Acquisition itself sits behind [`SensorPort`](crate::app::ports::SensorPort).
//! The only source shipped here is the deterministic [`SimulatedUps`].

pub mod simulated;

pub use simulated::SimulatedUps;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Battery percentage assumed when the field is missing.
pub const DEFAULT_PERCENTAGE: i32 = 0;
/// Battery voltage assumed when the field is missing (V).
pub const DEFAULT_VOLTAGE_V: f32 = 4.0;
/// Board temperature assumed when the field is missing (°C).
pub const DEFAULT_TEMPERATURE_C: f32 = 25.0;

/// Battery current above which the pack counts as charging (A).
const CHARGE_CURRENT_THRESHOLD_A: f32 = 0.1;

// ───────────────────────────────────────────────────────────────
// ChargingStatus
// ───────────────────────────────────────────────────────────────

/// Charger state reported by the UPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargingStatus {
    Charging,
    Discharging,
    Full,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChargingStatus {
    /// Derive the status from AC presence and signed battery current
    /// (positive = into the pack).
    pub fn derive(ac_present: bool, battery_current_a: f32) -> Self {
        if !ac_present {
            Self::Discharging
        } else if battery_current_a > CHARGE_CURRENT_THRESHOLD_A {
            Self::Charging
        } else if battery_current_a < -CHARGE_CURRENT_THRESHOLD_A {
            Self::Discharging
        } else {
            Self::Full
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Charging => "CHARGING",
            Self::Discharging => "DISCHARGING",
            Self::Full => "FULL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Lenient text decode; anything unrecognised is `Unknown`.
    pub fn from_text(text: &str) -> Self {
        match text {
            "CHARGING" => Self::Charging,
            "DISCHARGING" => Self::Discharging,
            "FULL" => Self::Full,
            _ => Self::Unknown,
        }
    }
}

impl core::fmt::Display for ChargingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───────────────────────────────────────────────────────────────
// Readings
// ───────────────────────────────────────────────────────────────

/// One immutable snapshot of UPS sensor values for a single poll tick.
///
/// Every field has a documented default, so a partially populated
/// snapshot is still usable.  Only the first five fields feed the LED
/// resolver; the rest are carried for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Readings {
    /// State of charge, expected 0–100 but not guaranteed.
    #[serde(rename = "battery_percentage")]
    pub percentage: i32,
    /// Battery terminal voltage (V).
    #[serde(rename = "battery_voltage")]
    pub voltage_v: f32,
    /// Board temperature (°C).
    #[serde(rename = "temperature")]
    pub temperature_c: f32,
    pub charging_status: ChargingStatus,
    /// Mains adapter connected.
    pub ac_present: bool,

    /// Battery current (A); positive while charging.
    #[serde(rename = "battery_current")]
    pub battery_current_a: f32,
    /// Adapter input voltage (V).
    #[serde(rename = "input_voltage")]
    pub input_voltage_v: f32,
    /// Regulated output voltage (V).
    #[serde(rename = "output_voltage")]
    pub output_voltage_v: f32,
    /// Load current drawn by the host (A).
    #[serde(rename = "load_current")]
    pub load_current_a: f32,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            percentage: DEFAULT_PERCENTAGE,
            voltage_v: DEFAULT_VOLTAGE_V,
            temperature_c: DEFAULT_TEMPERATURE_C,
            charging_status: ChargingStatus::Unknown,
            ac_present: false,
            battery_current_a: 0.0,
            input_voltage_v: 0.0,
            output_voltage_v: 0.0,
            load_current_a: 0.0,
        }
    }
}

impl Readings {
    /// Decode a snapshot from loosely-typed JSON.
    ///
    /// Never fails: a field that is missing or has the wrong type takes
    /// its default.  Fractional percentages are truncated and integers
    /// outside `i32` saturate.
    pub fn from_value(value: &Value) -> Self {
        let d = Self::default();
        Self {
            percentage: int_field(value, "battery_percentage").unwrap_or(d.percentage),
            voltage_v: float_field(value, "battery_voltage").unwrap_or(d.voltage_v),
            temperature_c: float_field(value, "temperature").unwrap_or(d.temperature_c),
            charging_status: value
                .get("charging_status")
                .and_then(Value::as_str)
                .map_or(d.charging_status, ChargingStatus::from_text),
            ac_present: value
                .get("ac_present")
                .and_then(Value::as_bool)
                .unwrap_or(d.ac_present),
            battery_current_a: float_field(value, "battery_current")
                .unwrap_or(d.battery_current_a),
            input_voltage_v: float_field(value, "input_voltage").unwrap_or(d.input_voltage_v),
            output_voltage_v: float_field(value, "output_voltage").unwrap_or(d.output_voltage_v),
            load_current_a: float_field(value, "load_current").unwrap_or(d.load_current_a),
        }
    }
}

fn int_field(value: &Value, key: &str) -> Option<i32> {
    let field = value.get(key)?;
    if let Some(i) = field.as_i64() {
        return Some(i.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);
    }
    if field.is_u64() {
        // Only reachable for values above i64::MAX.
        return Some(i32::MAX);
    }
    // `as` saturates and maps NaN to 0.
    field.as_f64().map(|f| f.trunc() as i32)
}

fn float_field(value: &Value, key: &str) -> Option<f32> {
    value.get(key).and_then(Value::as_f64).map(|f| f as f32)
}

// ───────────────────────────────────────────────────────────────
// Battery maths
// ───────────────────────────────────────────────────────────────

/// Single-cell Li-ion state of charge from resting voltage.
///
/// Piecewise-linear curve, truncated to a whole percent and clamped to
/// `0..=100`.
pub fn percentage_from_voltage(voltage_v: f32) -> i32 {
    let pct = if voltage_v >= 4.1 {
        100.0
    } else if voltage_v >= 3.9 {
        80.0 + (voltage_v - 3.9) * 100.0
    } else if voltage_v >= 3.7 {
        40.0 + (voltage_v - 3.7) * 200.0
    } else if voltage_v >= 3.5 {
        20.0 + (voltage_v - 3.5) * 100.0
    } else if voltage_v >= 3.3 {
        5.0 + (voltage_v - 3.3) * 75.0
    } else {
        0.0
    };
    (pct as i32).clamp(0, 100)
}
