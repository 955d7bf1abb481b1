//! Unified error types for the UPS monitor.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! service and the binary handle failures uniformly.  Sensor anomalies
//! never surface here; defaults and fallbacks absorb them.

use core::fmt;

use crate::app::ports::ConfigError;
use crate::led::pattern::LedId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A custom LED pattern was rejected.
    Pattern(PatternError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "pattern: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Pattern errors
// ---------------------------------------------------------------------------

/// Rejection of a custom pattern.  Nothing is applied when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// LED name is not `LED1`..`LED4`.
    UnknownLed(String),
    /// State text is not one of the five LED states.
    UnknownState { led: LedId, value: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLed(name) => write!(f, "unknown LED '{name}'"),
            Self::UnknownState { led, value } => {
                write!(f, "unknown state '{value}' for {led}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

impl From<PatternError> for Error {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults are accumulated in a bitfield by the safety supervisor
/// so that several can be active at once and cleared individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Battery voltage below the critical cutoff.
    BatteryCritical = 0b0000_0001,
    /// Board temperature above the shutdown limit.
    OverTemperature = 0b0000_0010,
    /// Battery voltage low but not yet critical.
    BatteryLow = 0b0000_0100,
    /// Board temperature elevated but not yet over the limit.
    TemperatureElevated = 0b0000_1000,
}

impl SafetyFault {
    pub const ALL: [SafetyFault; 4] = [
        SafetyFault::BatteryCritical,
        SafetyFault::OverTemperature,
        SafetyFault::BatteryLow,
        SafetyFault::TemperatureElevated,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Critical faults make the system unsafe; the rest are warnings.
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::BatteryCritical | Self::OverTemperature)
    }

    /// Faults whose bit is set in `mask`, in declaration order.
    pub fn in_mask(mask: u8) -> impl Iterator<Item = SafetyFault> {
        Self::ALL.into_iter().filter(move |f| mask & f.mask() != 0)
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BatteryCritical => write!(f, "battery voltage critically low"),
            Self::OverTemperature => write!(f, "temperature too high"),
            Self::BatteryLow => write!(f, "battery voltage low"),
            Self::TemperatureElevated => write!(f, "temperature elevated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
