//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the LED manager, the safety supervisor and
//! the active configuration.  All I/O flows through port traits
//! injected at call sites, so the whole service runs against mock
//! adapters in tests.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │      MonitorService       │
//! IndicatorPort ◀─│  Safety · LedManager      │
//!                 └──────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::analytics::PowerAnalytics;
use crate::config::MonitorConfig;
use crate::error::Result;
use crate::led::manager::LedManager;
use crate::led::pattern::{LED_COUNT, LedId, Pattern};
use crate::led::resolver::LedResolver;
use crate::safety::{SafetyStatus, SafetySupervisor};
use crate::sensors::Readings;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, IndicatorPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    config: MonitorConfig,
    leds: LedManager,
    safety: SafetySupervisor,
    analytics: PowerAnalytics,
    /// Most recent sensor snapshot.
    last: Readings,
    tick_count: u64,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any output (call [`start`](Self::start) next).
    pub fn new(config: MonitorConfig) -> Self {
        let leds = LedManager::from_config(&config);
        let safety = SafetySupervisor::new(&config.safety);
        Self {
            config,
            leds,
            safety,
            analytics: PowerAnalytics::new(),
            last: Readings::default(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Blank the display and announce startup.
    pub fn start(&mut self, indicator: &mut impl IndicatorPort, sink: &mut impl EventSink) {
        indicator.set_timing(&self.config.timing);
        self.leds.clear_display();
        let pattern = self.leds.current_pattern();
        indicator.show(pattern);
        sink.emit(&AppEvent::Started(pattern));
        info!(
            "MonitorService started ({} bands, poll {} ms)",
            self.config.battery_levels.len(),
            self.config.poll_interval_ms
        );
    }

    /// Blank the display on the way out.
    pub fn stop(&mut self, indicator: &mut impl IndicatorPort, sink: &mut impl EventSink) {
        self.leds.clear_display();
        indicator.show(Pattern::ALL_OFF);
        sink.emit(&AppEvent::Stopped);
        info!("MonitorService stopped after {} ticks", self.tick_count);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll cycle: read sensors → analytics → safety → resolve →
    /// display.
    pub fn tick(
        &mut self,
        sensors: &mut impl SensorPort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Pattern {
        let readings = sensors.read_all();
        self.process(readings, indicator, sink)
    }

    /// Run one poll cycle on a snapshot the caller already has.
    pub fn process(
        &mut self,
        readings: Readings,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Pattern {
        self.tick_count += 1;
        let prev_pattern = self.leds.current_pattern();
        let prev_faults = self.safety.faults();

        // 1. Record the snapshot
        self.last = readings;
        self.analytics.update(&readings, self.config.poll_interval_ms);

        // 2. Safety evaluation
        let faults = self.safety.evaluate(&readings);
        if faults & !prev_faults != 0 {
            warn!("Safety fault! flags=0b{:08b}", faults);
            sink.emit(&AppEvent::FaultDetected(faults));
        } else if faults == 0 && prev_faults != 0 {
            sink.emit(&AppEvent::FaultCleared);
        }

        // 3. Resolve and publish
        let pattern = self.leds.update_display(&readings);
        indicator.show(pattern);

        // 4. Emit pattern change
        if pattern != prev_pattern {
            sink.emit(&AppEvent::PatternChanged {
                from: prev_pattern,
                to: pattern,
            });
        }

        // 5. Periodic telemetry
        if self.tick_count % u64::from(self.config.telemetry_interval_ticks.max(1)) == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        pattern
    }

    /// Feed snapshots from `next` through [`process`](Self::process)
    /// until it returns `None` or `limit` ticks have run in total.
    ///
    /// `pace` runs between polls, never after the last one.  Returns the
    /// number of ticks run by this call.
    pub fn run<I: IndicatorPort, E: EventSink>(
        &mut self,
        mut next: impl FnMut() -> Option<Readings>,
        indicator: &mut I,
        sink: &mut E,
        limit: Option<u64>,
        mut pace: impl FnMut(&mut I),
    ) -> u64 {
        let start = self.tick_count;
        let done = |ticks: u64| limit.is_some_and(|n| ticks >= n);

        while !done(self.tick_count) {
            let Some(readings) = next() else {
                info!("Readings source exhausted after {} ticks", self.tick_count);
                break;
            };
            self.process(readings, indicator, sink);
            if done(self.tick_count) {
                break;
            }
            pace(indicator);
        }
        self.tick_count - start
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  A rejected command changes nothing.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::SetCustomPattern(entries) => {
                let prev = self.leds.current_pattern();
                let pattern = self.leds.set_custom_pattern(entries)?;
                indicator.show(pattern);
                if pattern != prev {
                    sink.emit(&AppEvent::PatternChanged {
                        from: prev,
                        to: pattern,
                    });
                }
            }
            AppCommand::ClearDisplay => {
                let prev = self.leds.current_pattern();
                self.leds.clear_display();
                indicator.show(Pattern::ALL_OFF);
                if prev != Pattern::ALL_OFF {
                    sink.emit(&AppEvent::PatternChanged {
                        from: prev,
                        to: Pattern::ALL_OFF,
                    });
                }
            }
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                self.leds
                    .set_resolver(LedResolver::new(new_config.battery_levels.clone()));
                self.safety.set_limits(&new_config.safety);
                indicator.set_timing(&new_config.timing);
                self.config = new_config;
                sink.emit(&AppEvent::ConfigUpdated);
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    /// Run the LED self-test on `indicator`.  Blocks for its full length.
    pub fn self_test(&self, indicator: &mut impl IndicatorPort, delay: &mut impl DelayNs) {
        self.leds.run_self_test(indicator, delay);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the latest readings.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            tick: self.tick_count,
            percentage: self.last.percentage,
            voltage_v: self.last.voltage_v,
            temperature_c: self.last.temperature_c,
            charging_status: self.last.charging_status,
            ac_present: self.last.ac_present,
            battery_current_a: self.last.battery_current_a,
            load_current_a: self.last.load_current_a,
            pattern: self.leds.current_pattern(),
            fault_flags: self.safety.faults(),
            runtime_min: self.analytics.runtime().minutes,
            avg_voltage_v: self
                .analytics
                .average_voltage()
                .unwrap_or(self.last.voltage_v),
            energy_wh: self.analytics.energy_wh(),
            on_battery_ticks: self.analytics.on_battery_ticks(),
            ac_time_ms: self.analytics.ac_time_ms(),
            battery_time_ms: self.analytics.battery_time_ms(),
        }
    }

    pub fn current_pattern(&self) -> Pattern {
        self.leds.current_pattern()
    }

    pub fn current_status(&self) -> [(LedId, &'static str); LED_COUNT] {
        self.leds.current_status()
    }

    /// Shared handle for status readers on other threads.
    pub fn leds(&self) -> &LedManager {
        &self.leds
    }

    pub fn fault_flags(&self) -> u8 {
        self.safety.faults()
    }

    pub fn analytics(&self) -> &PowerAnalytics {
        &self.analytics
    }

    pub fn safety_status(&self) -> SafetyStatus {
        self.safety.status()
    }

    pub fn last_readings(&self) -> &Readings {
        &self.last
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
