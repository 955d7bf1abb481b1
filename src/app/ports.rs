//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensor sources, LED outputs, event sinks, config
//! stores) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::{BlinkTiming, MonitorConfig};
use crate::led::pattern::Pattern;
use crate::sensors::Readings;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per poll tick.
///
/// Implementations own their own validation.  Whatever they return is
/// accepted as-is; out-of-range values are handled by the resolver's
/// fallbacks.
pub trait SensorPort {
    fn read_all(&mut self) -> Readings;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs / display)
// ───────────────────────────────────────────────────────────────

/// Write-side port: receives every pattern the domain publishes.
///
/// Outputs that animate blink and pulse states themselves also take the
/// configured timing and a periodic refresh; static outputs keep the
/// no-op defaults.
pub trait IndicatorPort {
    fn show(&mut self, pattern: Pattern);

    /// Adopt new blink and pulse timing.
    fn set_timing(&mut self, _timing: &BlinkTiming) {}

    /// Advance animated states to `now_ms`.  The host calls this every
    /// `refresh_rate` milliseconds.
    fn refresh(&mut self, _now_ms: u32) {}
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ← external config)
// ───────────────────────────────────────────────────────────────

/// Loads the monitor configuration.
///
/// Implementations MUST validate before returning.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Returns [`MonitorConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
