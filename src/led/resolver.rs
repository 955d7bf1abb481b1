//! Readings → LED pattern resolver.
//!
//! Three stages run in a fixed order, each taking the previous stage's
//! output plus the input readings:
//!
//! 1. **Level**: battery percentage selects a base pattern from the
//!    band table.
//! 2. **Status**: charging pulses the lit LEDs; running on battery
//!    blinks the top lit LED.
//! 3. **Safety**: critical voltage replaces everything with a fast
//!    blink; over-temperature slow-blinks the lit LEDs.
//!
//! Every call is a full recomputation.  Nothing carries over between
//! polls.

use serde::{Deserialize, Serialize};

use super::pattern::{LedState, Pattern};
use crate::sensors::{ChargingStatus, Readings};

/// Below this battery voltage the whole bank fast-blinks (V).
pub const CRITICAL_VOLTAGE_V: f32 = 3.2;
/// Above this temperature lit LEDs slow-blink (°C).
pub const OVER_TEMPERATURE_C: f32 = 60.0;

/// Capacity of a band table.
pub const MAX_BANDS: usize = 8;
/// Longest band name.
pub const MAX_BAND_NAME: usize = 16;

/// Lowest and highest meaningful battery percentage.
pub const PERCENT_MIN: i32 = 0;
pub const PERCENT_MAX: i32 = 100;

pub type BandName = heapless::String<MAX_BAND_NAME>;
pub type BandTable = heapless::Vec<LevelBand, MAX_BANDS>;

// ───────────────────────────────────────────────────────────────
// Level bands
// ───────────────────────────────────────────────────────────────

/// A named, inclusive percentage range with its base pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBand {
    pub name: BandName,
    /// Inclusive `[min, max]`.
    pub range: [i32; 2],
    pub pattern: Pattern,
}

impl LevelBand {
    /// Build a band.  Names longer than [`MAX_BAND_NAME`] are cut short.
    pub fn new(name: &str, min: i32, max: i32, pattern: Pattern) -> Self {
        let mut n = BandName::new();
        for c in name.chars() {
            if n.push(c).is_err() {
                break;
            }
        }
        Self {
            name: n,
            range: [min, max],
            pattern,
        }
    }

    pub fn min(&self) -> i32 {
        self.range[0]
    }

    pub fn max(&self) -> i32 {
        self.range[1]
    }

    pub fn contains(&self, percentage: i32) -> bool {
        (self.min()..=self.max()).contains(&percentage)
    }
}

/// Stock five-band table: critical, low, medium, high, full.
pub fn default_bands() -> BandTable {
    use LedState::{BlinkFast, Off, On};
    [
        LevelBand::new("critical", 0, 5, Pattern::from_states([BlinkFast, Off, Off, Off])),
        LevelBand::new("low", 6, 25, Pattern::from_states([On, Off, Off, Off])),
        LevelBand::new("medium", 26, 50, Pattern::from_states([On, On, Off, Off])),
        LevelBand::new("high", 51, 75, Pattern::from_states([On, On, On, Off])),
        LevelBand::new("full", 76, 100, Pattern::from_states([On, On, On, On])),
    ]
    .into_iter()
    .collect()
}

// ───────────────────────────────────────────────────────────────
// Resolver
// ───────────────────────────────────────────────────────────────

/// Stateless resolver over an injected band table.
#[derive(Debug, Clone, PartialEq)]
pub struct LedResolver {
    bands: BandTable,
}

impl LedResolver {
    pub fn new(bands: BandTable) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[LevelBand] {
        &self.bands
    }

    /// First band whose range holds `percentage`.
    pub fn band_for(&self, percentage: i32) -> Option<&LevelBand> {
        if !(PERCENT_MIN..=PERCENT_MAX).contains(&percentage) {
            return None;
        }
        self.bands.iter().find(|b| b.contains(percentage))
    }

    /// Base pattern for a battery percentage.
    ///
    /// Out-of-range percentages and gaps in the table give all-off.
    pub fn level_pattern(&self, percentage: i32) -> Pattern {
        self.band_for(percentage)
            .map_or(Pattern::ALL_OFF, |b| b.pattern)
    }

    /// Run all three stages.
    pub fn resolve(&self, readings: &Readings) -> Pattern {
        let pattern = self.level_pattern(readings.percentage);
        let pattern = apply_status(pattern, readings.charging_status, readings.ac_present);
        apply_safety(pattern, readings.voltage_v, readings.temperature_c)
    }
}

impl Default for LedResolver {
    fn default() -> Self {
        Self::new(default_bands())
    }
}

/// Charging and mains modifiers.
pub fn apply_status(pattern: Pattern, status: ChargingStatus, ac_present: bool) -> Pattern {
    match status {
        ChargingStatus::Charging => pattern.replace_all(LedState::On, LedState::Pulse),
        ChargingStatus::Discharging if !ac_present => match pattern.highest_in(LedState::On) {
            Some(top) => pattern.with(top, LedState::BlinkSlow),
            None => pattern,
        },
        _ => pattern,
    }
}

/// Voltage and temperature overrides.  Evaluated last.
pub fn apply_safety(pattern: Pattern, voltage_v: f32, temperature_c: f32) -> Pattern {
    if voltage_v < CRITICAL_VOLTAGE_V {
        Pattern::uniform(LedState::BlinkFast)
    } else if temperature_c > OVER_TEMPERATURE_C {
        pattern.replace_all(LedState::On, LedState::BlinkSlow)
    } else {
        pattern
    }
}
