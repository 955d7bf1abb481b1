//! Runtime estimation and power accounting.
//!
//! [`PowerAnalytics`] is fed one snapshot per poll tick by the service.
//! It keeps a bounded voltage history, splits elapsed time between
//! mains and battery, integrates the energy delivered to the load and
//! estimates how long the battery would last at the present current.
//!
//! Time is counted in nominal ticks of `poll_interval_ms`, not wall
//! clock, so the figures are reproducible under test.

use heapless::HistoryBuffer;

use crate::sensors::Readings;

/// Nominal pack capacity used for runtime estimation (mAh).
pub const BATTERY_CAPACITY_MAH: f32 = 2500.0;
/// Below this battery current (A, either direction) no estimate is made.
pub const MIN_CURRENT_A: f32 = 0.1;
/// Voltage samples retained.
pub const HISTORY_CAPACITY: usize = 1000;
/// Samples averaged by [`PowerAnalytics::average_voltage`].
pub const AVERAGE_WINDOW: usize = 10;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Remaining runtime at the present draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RuntimeEstimate {
    pub minutes: f32,
    pub hours: f32,
}

impl RuntimeEstimate {
    /// Estimate from state of charge and battery current.
    ///
    /// Currents at or below [`MIN_CURRENT_A`] (and NaN) give zero, as
    /// does a non-positive percentage.  Percentages above 100 count as
    /// full.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn from_readings(percentage: i32, battery_current_a: f32) -> Self {
        let current = battery_current_a.abs();
        if !(current > MIN_CURRENT_A) {
            return Self::default();
        }
        let soc = percentage.clamp(0, 100) as f32 / 100.0;
        let remaining_mah = soc * BATTERY_CAPACITY_MAH;
        let hours = remaining_mah / (current * 1000.0);
        Self {
            minutes: hours * 60.0,
            hours,
        }
    }
}

/// Rolling battery analytics.
#[derive(Debug, Clone)]
pub struct PowerAnalytics {
    voltages: HistoryBuffer<f32, HISTORY_CAPACITY>,
    runtime: RuntimeEstimate,
    ac_ms: u64,
    battery_ms: u64,
    /// Time on battery since mains was last present.
    battery_stint_ms: u64,
    on_battery_ticks: u64,
    energy_wh: f64,
}

impl Default for PowerAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerAnalytics {
    pub fn new() -> Self {
        Self {
            voltages: HistoryBuffer::new(),
            runtime: RuntimeEstimate::default(),
            ac_ms: 0,
            battery_ms: 0,
            battery_stint_ms: 0,
            on_battery_ticks: 0,
            energy_wh: 0.0,
        }
    }

    /// Fold in one snapshot that stands for `elapsed_ms` of operation.
    pub fn update(&mut self, readings: &Readings, elapsed_ms: u32) {
        let dt = u64::from(elapsed_ms);

        if readings.voltage_v.is_finite() {
            self.voltages.write(readings.voltage_v);
        }

        if readings.ac_present {
            self.ac_ms += dt;
            self.battery_stint_ms = 0;
        } else {
            self.battery_ms += dt;
            self.battery_stint_ms += dt;
            self.on_battery_ticks += 1;
        }

        let watts = f64::from(readings.load_current_a) * f64::from(readings.output_voltage_v);
        if watts.is_finite() && watts > 0.0 {
            self.energy_wh += watts * dt as f64 / MS_PER_HOUR;
        }

        self.runtime =
            RuntimeEstimate::from_readings(readings.percentage, readings.battery_current_a);
    }

    /// Mean of the last [`AVERAGE_WINDOW`] voltages, `None` before the
    /// first sample.
    pub fn average_voltage(&self) -> Option<f32> {
        let len = self.voltages.len();
        if len == 0 {
            return None;
        }
        let window = len.min(AVERAGE_WINDOW);
        let sum: f32 = self.voltages.oldest_ordered().skip(len - window).sum();
        Some(sum / window as f32)
    }

    /// Voltage samples held, at most [`HISTORY_CAPACITY`].
    pub fn data_points(&self) -> usize {
        self.voltages.len()
    }

    pub fn runtime(&self) -> RuntimeEstimate {
        self.runtime
    }

    pub fn ac_time_ms(&self) -> u64 {
        self.ac_ms
    }

    pub fn battery_time_ms(&self) -> u64 {
        self.battery_ms
    }

    pub fn battery_stint_ms(&self) -> u64 {
        self.battery_stint_ms
    }

    pub fn on_battery_ticks(&self) -> u64 {
        self.on_battery_ticks
    }

    /// Energy delivered to the load so far (Wh).
    pub fn energy_wh(&self) -> f64 {
        self.energy_wh
    }
}
