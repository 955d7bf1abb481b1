//! Monitor configuration parameters
//!
//! All tunable parameters for the UPS monitor.  The stock values below
//! apply when no external configuration is supplied; a loaded config
//! may override any section and omit the rest.

use core::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::app::ports::ConfigError;
use crate::led::pattern::Pattern;
use crate::led::resolver::{
    BandName, BandTable, LevelBand, MAX_BANDS, PERCENT_MAX, PERCENT_MIN, default_bands,
};

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- LED mapping ---
    /// Battery percentage bands and their base LED patterns.  Accepts a
    /// list of bands or an object keyed by band name.
    #[serde(deserialize_with = "deserialize_bands")]
    pub battery_levels: BandTable,
    /// Blink and pulse timing for the LED output driver
    pub timing: BlinkTiming,

    // --- Safety ---
    pub safety: SafetyConfig,

    // --- Timing ---
    /// Sensor poll interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Emit a telemetry event every N poll ticks
    pub telemetry_interval_ticks: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            battery_levels: default_bands(),
            timing: BlinkTiming::default(),
            safety: SafetyConfig::default(),
            poll_interval_ms: 1000,      // 1 Hz
            telemetry_interval_ticks: 10, // every 10 s at 1 Hz
        }
    }
}

/// One on/off square-wave cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkPeriod {
    #[serde(rename = "on_duration")]
    pub on_ms: u32,
    #[serde(rename = "off_duration")]
    pub off_ms: u32,
}

impl BlinkPeriod {
    pub const fn period_ms(&self) -> u32 {
        self.on_ms.saturating_add(self.off_ms)
    }
}

/// LED output timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkTiming {
    pub blink_slow: BlinkPeriod,
    pub blink_fast: BlinkPeriod,
    /// Full up-and-down breathing cycle for `Pulse` (milliseconds)
    pub pulse_period_ms: u32,
    /// How often the output driver should be refreshed (milliseconds)
    #[serde(rename = "refresh_rate")]
    pub refresh_rate_ms: u32,
}

impl Default for BlinkTiming {
    fn default() -> Self {
        Self {
            blink_slow: BlinkPeriod {
                on_ms: 1000,
                off_ms: 1000,
            },
            blink_fast: BlinkPeriod {
                on_ms: 125,
                off_ms: 125,
            },
            pulse_period_ms: 2000,
            refresh_rate_ms: 100,
        }
    }
}

/// Safety supervisor thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Below this voltage the battery is critical (V)
    pub critical_voltage_v: f32,
    /// Below this voltage the battery is low (V)
    pub low_voltage_v: f32,
    /// Above this temperature the board is too hot (°C)
    pub max_temperature_c: f32,
    /// Above this temperature the board is warm (°C)
    pub warn_temperature_c: f32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            critical_voltage_v: 3.2,
            low_voltage_v: 3.5,
            max_temperature_c: 60.0,
            warn_temperature_c: 50.0,
        }
    }
}

impl MonitorConfig {
    /// Reject configurations the monitor cannot run with.
    ///
    /// Threshold comparisons are negated so NaN fails them.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bands(&self.battery_levels)?;

        let t = &self.timing;
        if t.blink_slow.on_ms == 0 || t.blink_slow.off_ms == 0 {
            return Err(ConfigError::ValidationFailed("blink_slow durations must be > 0"));
        }
        if t.blink_fast.on_ms == 0 || t.blink_fast.off_ms == 0 {
            return Err(ConfigError::ValidationFailed("blink_fast durations must be > 0"));
        }
        if t.pulse_period_ms < 2 {
            return Err(ConfigError::ValidationFailed("pulse_period_ms must be >= 2"));
        }
        if t.refresh_rate_ms == 0 {
            return Err(ConfigError::ValidationFailed("refresh_rate must be > 0"));
        }

        let s = &self.safety;
        if !(s.critical_voltage_v < s.low_voltage_v) {
            return Err(ConfigError::ValidationFailed(
                "critical_voltage_v must be below low_voltage_v",
            ));
        }
        if !(s.warn_temperature_c < s.max_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "warn_temperature_c must be below max_temperature_c",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        if self.telemetry_interval_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_ticks must be > 0",
            ));
        }
        Ok(())
    }
}

/// Body of a band in the name-keyed form.
#[derive(Deserialize)]
struct BandBody {
    range: [i32; 2],
    pattern: Pattern,
}

struct BandsVisitor;

impl<'de> Visitor<'de> for BandsVisitor {
    type Value = BandTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a list of bands or a map of band name to band (at most {MAX_BANDS})")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<BandTable, A::Error> {
        let mut bands = BandTable::new();
        while let Some(band) = seq.next_element::<LevelBand>()? {
            bands
                .push(band)
                .map_err(|_| de::Error::invalid_length(MAX_BANDS + 1, &self))?;
        }
        Ok(bands)
    }

    /// Entries keep document order.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<BandTable, A::Error> {
        let mut bands = BandTable::new();
        while let Some((name, body)) = map.next_entry::<BandName, BandBody>()? {
            let band = LevelBand {
                name,
                range: body.range,
                pattern: body.pattern,
            };
            bands
                .push(band)
                .map_err(|_| de::Error::invalid_length(MAX_BANDS + 1, &self))?;
        }
        Ok(bands)
    }
}

fn deserialize_bands<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BandTable, D::Error> {
    deserializer.deserialize_any(BandsVisitor)
}

/// Bands must tile 0..=100 exactly: no gaps, no overlaps.
fn validate_bands(bands: &[LevelBand]) -> Result<(), ConfigError> {
    if bands.is_empty() {
        return Err(ConfigError::ValidationFailed("battery_levels is empty"));
    }
    if bands.iter().any(|b| b.min() > b.max()) {
        return Err(ConfigError::ValidationFailed("band range min exceeds max"));
    }

    let mut ranges: heapless::Vec<[i32; 2], MAX_BANDS> =
        bands.iter().map(|b| b.range).collect();
    ranges.sort_unstable_by_key(|r| r[0]);

    if ranges[0][0] != PERCENT_MIN {
        return Err(ConfigError::ValidationFailed("bands must start at 0"));
    }
    for pair in ranges.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next[0] <= prev[1] {
            return Err(ConfigError::ValidationFailed("bands overlap"));
        }
        if next[0] != prev[1] + 1 {
            return Err(ConfigError::ValidationFailed("gap between bands"));
        }
    }
    if ranges[ranges.len() - 1][1] != PERCENT_MAX {
        return Err(ConfigError::ValidationFailed("bands must end at 100"));
    }
    Ok(())
}
