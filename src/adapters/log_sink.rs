//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  The binary routes that to stderr through
//! `tracing-subscriber`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::SafetyFault;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | tick={} | batt={}% {:.2}V {:+.2}A | T={:.1}\u{00b0}C | \
                     {} ac={} | load={:.2}A | leds=[{}] | faults=0b{:08b} | \
                     runtime={:.1}min avg={:.2}V energy={:.3}Wh | \
                     on_ac={}s on_batt={}s ({} ticks)",
                    t.tick,
                    t.percentage,
                    t.voltage_v,
                    t.battery_current_a,
                    t.temperature_c,
                    t.charging_status,
                    if t.ac_present { "ON" } else { "OFF" },
                    t.load_current_a,
                    t.pattern,
                    t.fault_flags,
                    t.runtime_min,
                    t.avg_voltage_v,
                    t.energy_wh,
                    t.ac_time_ms / 1000,
                    t.battery_time_ms / 1000,
                    t.on_battery_ticks,
                );
            }
            AppEvent::PatternChanged { from, to } => {
                info!("LEDS | [{}] -> [{}]", from, to);
            }
            AppEvent::FaultDetected(flags) => {
                for fault in SafetyFault::in_mask(*flags) {
                    warn!("FAULT | active: {fault}");
                }
                info!("FAULT | detected, flags=0b{:08b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::ConfigUpdated => {
                info!("CONFIG | updated");
            }
            AppEvent::Started(pattern) => {
                info!("START | leds=[{}]", pattern);
            }
            AppEvent::Stopped => {
                info!("STOP | display cleared");
            }
        }
    }
}
