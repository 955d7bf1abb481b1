//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use crate::led::pattern::Pattern;
use crate::sensors::ChargingStatus;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The monitor has started (carries the initial pattern).
    Started(Pattern),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The published LED pattern changed.
    PatternChanged { from: Pattern, to: Pattern },

    /// One or more new safety faults were raised.  Carries the full mask.
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// A new configuration was applied at runtime.
    ConfigUpdated,

    /// The monitor stopped and cleared the display.
    Stopped,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub tick: u64,
    pub percentage: i32,
    pub voltage_v: f32,
    pub temperature_c: f32,
    pub charging_status: ChargingStatus,
    pub ac_present: bool,
    pub battery_current_a: f32,
    pub load_current_a: f32,
    pub pattern: Pattern,
    pub fault_flags: u8,
    /// Estimated minutes left at the present battery current.
    pub runtime_min: f32,
    /// Mean of the most recent battery voltages.
    pub avg_voltage_v: f32,
    /// Energy delivered to the load since start (Wh).
    pub energy_wh: f64,
    pub on_battery_ticks: u64,
    pub ac_time_ms: u64,
    pub battery_time_ms: u64,
}
