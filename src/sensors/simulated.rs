//! Deterministic UPS simulation for development without the HAT.
//!
//! Mains presence toggles every `ac_period_ticks` reads.  On battery the
//! cell voltage sags each tick; on mains it climbs until the charge
//! cutoff.  Percentage and charging status are then derived with the
//! same maths a real sensor source would use.

use crate::app::ports::SensorPort;

use super::{ChargingStatus, Readings, percentage_from_voltage};

const CHARGE_CUTOFF_V: f32 = 4.15;
const MIN_CELL_V: f32 = 3.0;
const MAX_CELL_V: f32 = 4.2;
const CHARGE_STEP_V: f32 = 0.02;
const DISCHARGE_STEP_V: f32 = 0.03;
const CHARGE_CURRENT_A: f32 = 1.0;
const DISCHARGE_CURRENT_A: f32 = -1.2;
const ADAPTER_V: f32 = 5.1;
const OUTPUT_V: f32 = 5.0;

/// Scripted UPS that implements [`SensorPort`].
#[derive(Debug, Clone)]
pub struct SimulatedUps {
    voltage_v: f32,
    ac_present: bool,
    ticks: u32,
    ac_period_ticks: u32,
}

impl SimulatedUps {
    /// Start on mains at a mid-charge voltage.  A period of 0 keeps
    /// mains connected forever.
    pub fn new(ac_period_ticks: u32) -> Self {
        Self {
            voltage_v: 3.85,
            ac_present: true,
            ticks: 0,
            ac_period_ticks,
        }
    }

    #[must_use]
    pub fn with_voltage(mut self, voltage_v: f32) -> Self {
        self.voltage_v = voltage_v.clamp(MIN_CELL_V, MAX_CELL_V);
        self
    }

    #[must_use]
    pub fn with_ac(mut self, ac_present: bool) -> Self {
        self.ac_present = ac_present;
        self
    }

    pub fn voltage_v(&self) -> f32 {
        self.voltage_v
    }

    fn step(&mut self) -> Readings {
        self.ticks = self.ticks.wrapping_add(1);
        if self.ac_period_ticks > 0 && self.ticks % self.ac_period_ticks == 0 {
            self.ac_present = !self.ac_present;
        }

        let battery_current_a = if !self.ac_present {
            DISCHARGE_CURRENT_A
        } else if self.voltage_v < CHARGE_CUTOFF_V {
            CHARGE_CURRENT_A
        } else {
            0.0
        };

        if battery_current_a > 0.0 {
            self.voltage_v += CHARGE_STEP_V;
        } else if battery_current_a < 0.0 {
            self.voltage_v -= DISCHARGE_STEP_V;
        }
        self.voltage_v = self.voltage_v.clamp(MIN_CELL_V, MAX_CELL_V);

        let phase = (self.ticks % 20) as f32;
        let charge_heat = if battery_current_a > 0.0 { 3.0 } else { 0.0 };

        Readings {
            percentage: percentage_from_voltage(self.voltage_v),
            voltage_v: self.voltage_v,
            temperature_c: 38.0 + phase * 0.5 + charge_heat,
            charging_status: ChargingStatus::derive(self.ac_present, battery_current_a),
            ac_present: self.ac_present,
            battery_current_a,
            input_voltage_v: if self.ac_present { ADAPTER_V } else { 0.0 },
            output_voltage_v: OUTPUT_V,
            load_current_a: 0.85 + (self.ticks % 5) as f32 * 0.1,
        }
    }
}

impl Default for SimulatedUps {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SensorPort for SimulatedUps {
    fn read_all(&mut self) -> Readings {
        self.step()
    }
}
