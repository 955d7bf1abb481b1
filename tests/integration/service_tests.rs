//! Integration tests for the MonitorService → LedManager → indicator
//! pipeline.
//!
//! These drive the service through mock ports and check what reaches
//! the LEDs and the event sink.

use super::mock_hw::{LogSink, RecordingLeds, ScriptedSensors, readings};

use embedded_hal::delay::DelayNs;
use upsmon::Error;
use upsmon::adapters::JsonReadings;
use upsmon::app::commands::AppCommand;
use upsmon::app::events::AppEvent;
use upsmon::app::ports::{ConfigError, IndicatorPort, SensorPort};
use upsmon::app::service::MonitorService;
use upsmon::config::MonitorConfig;
use upsmon::error::{PatternError, SafetyFault};
use upsmon::led::pattern::{LedId, LedState, Pattern};
use upsmon::led::resolver::LevelBand;
use upsmon::sensors::{ChargingStatus, Readings};

fn make_app() -> (MonitorService, RecordingLeds, LogSink) {
    let mut app = MonitorService::new(MonitorConfig::default());
    let mut leds = RecordingLeds::new();
    let mut sink = LogSink::new();
    app.start(&mut leds, &mut sink);
    (app, leds, sink)
}

fn custom(entries: &[(&str, &str)]) -> AppCommand {
    AppCommand::SetCustomPattern(
        entries
            .iter()
            .map(|(l, s)| ((*l).to_owned(), (*s).to_owned()))
            .collect(),
    )
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn start_blanks_display_and_announces() {
    let (app, leds, sink) = make_app();
    assert_eq!(leds.shown, vec![Pattern::ALL_OFF]);
    assert_eq!(sink.events, vec![AppEvent::Started(Pattern::ALL_OFF)]);
    assert_eq!(app.tick_count(), 0);
}

#[test]
fn stop_clears_display() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(
        90,
        3.9,
        30.0,
        ChargingStatus::Full,
        true,
    )]);
    app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(app.current_pattern(), Pattern::uniform(LedState::On));

    app.stop(&mut leds, &mut sink);
    assert_eq!(leds.last(), Some(Pattern::ALL_OFF));
    assert_eq!(app.current_pattern(), Pattern::ALL_OFF);
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped));
}

// ── Per-tick pipeline ─────────────────────────────────────────

#[test]
fn full_and_charging_pulses_every_led() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(
        90,
        3.9,
        30.0,
        ChargingStatus::Charging,
        true,
    )]);

    let p = app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(p, Pattern::uniform(LedState::Pulse));
    assert_eq!(leds.last(), Some(p));
    assert!(sink.events.contains(&AppEvent::PatternChanged {
        from: Pattern::ALL_OFF,
        to: p,
    }));
}

#[test]
fn unchanged_pattern_emits_one_change_event() {
    let (mut app, mut leds, mut sink) = make_app();
    let r = readings(60, 3.8, 30.0, ChargingStatus::Discharging, false);
    let mut sensors = ScriptedSensors::new([r, r, r]);

    for _ in 0..3 {
        app.tick(&mut sensors, &mut leds, &mut sink);
    }
    let changes = sink.count(|e| matches!(e, AppEvent::PatternChanged { .. }));
    assert_eq!(changes, 1);
    // Indicator still gets every tick's pattern.
    assert_eq!(leds.shown.len(), 4);
    assert_eq!(
        app.current_pattern().states(),
        [LedState::On, LedState::On, LedState::BlinkSlow, LedState::Off]
    );
}

#[test]
fn critical_battery_on_mains_loss() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(
        3,
        3.0,
        30.0,
        ChargingStatus::Discharging,
        false,
    )]);

    let p = app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(p, Pattern::uniform(LedState::BlinkFast));
    assert_eq!(app.fault_flags(), SafetyFault::BatteryCritical.mask());
    assert!(!app.safety_status().safe);
    assert!(
        sink.events
            .contains(&AppEvent::FaultDetected(SafetyFault::BatteryCritical.mask()))
    );
}

#[test]
fn fault_events_track_mask_transitions() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([
        readings(3, 3.0, 30.0, ChargingStatus::Discharging, false),
        readings(10, 3.4, 30.0, ChargingStatus::Discharging, false),
        readings(10, 3.4, 30.0, ChargingStatus::Discharging, false),
        readings(80, 3.95, 30.0, ChargingStatus::Charging, true),
    ]);

    for _ in 0..4 {
        app.tick(&mut sensors, &mut leds, &mut sink);
    }

    let faults: Vec<_> = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::FaultDetected(_) | AppEvent::FaultCleared))
        .cloned()
        .collect();
    assert_eq!(
        faults,
        vec![
            AppEvent::FaultDetected(SafetyFault::BatteryCritical.mask()),
            AppEvent::FaultDetected(SafetyFault::BatteryLow.mask()),
            AppEvent::FaultCleared,
        ]
    );
    assert_eq!(app.fault_flags(), 0);
}

#[test]
fn over_temperature_slow_blinks_and_faults() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(
        40,
        3.8,
        65.0,
        ChargingStatus::Full,
        true,
    )]);

    let p = app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(
        p.states(),
        [LedState::BlinkSlow, LedState::BlinkSlow, LedState::Off, LedState::Off]
    );
    assert_eq!(app.fault_flags(), SafetyFault::OverTemperature.mask());
}

#[test]
fn telemetry_every_n_ticks() {
    let config = MonitorConfig {
        telemetry_interval_ticks: 3,
        ..MonitorConfig::default()
    };
    let mut app = MonitorService::new(config);
    let mut leds = RecordingLeds::new();
    let mut sink = LogSink::new();
    app.start(&mut leds, &mut sink);

    let r = readings(55, 3.82, 41.5, ChargingStatus::Charging, true);
    let mut sensors = ScriptedSensors::new([r]);
    for _ in 0..7 {
        app.tick(&mut sensors, &mut leds, &mut sink);
    }

    let telem: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(telem.len(), 2);
    assert_eq!(telem[0].tick, 3);
    assert_eq!(telem[1].tick, 6);
    assert_eq!(telem[1].percentage, 55);
    assert_eq!(telem[1].charging_status, ChargingStatus::Charging);
    assert_eq!(telem[1].pattern, app.current_pattern());
    assert_eq!(sensors.reads, 7);
}

#[test]
fn telemetry_carries_power_analytics() {
    let config = MonitorConfig {
        telemetry_interval_ticks: 4,
        poll_interval_ms: 500,
        ..MonitorConfig::default()
    };
    let mut app = MonitorService::new(config);
    let mut leds = RecordingLeds::new();
    let mut sink = LogSink::new();
    app.start(&mut leds, &mut sink);

    let on_ac = readings(80, 4.0, 35.0, ChargingStatus::Charging, true);
    let on_batt = Readings {
        battery_current_a: -1.0,
        load_current_a: 1.0,
        output_voltage_v: 5.0,
        ..readings(40, 3.7, 35.0, ChargingStatus::Discharging, false)
    };
    let mut sensors = ScriptedSensors::new([on_ac, on_ac, on_batt, on_batt]);
    for _ in 0..4 {
        app.tick(&mut sensors, &mut leds, &mut sink);
    }

    let t = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .expect("telemetry on tick 4");
    assert_eq!(t.on_battery_ticks, 2);
    assert_eq!(t.ac_time_ms, 1000);
    assert_eq!(t.battery_time_ms, 1000);
    // 40 % of 2500 mAh at 1 A.
    assert!((t.runtime_min - 60.0).abs() < 1e-3);
    assert!((t.avg_voltage_v - 3.85).abs() < 1e-5);
    // 5 W for 1 s.
    assert!((t.energy_wh - 5.0 / 3600.0).abs() < 1e-9);
    assert_eq!(app.analytics().data_points(), 4);
}

// ── Poll loop ─────────────────────────────────────────────────

#[test]
fn run_with_zero_limit_never_reads() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(50, 3.8, 30.0, ChargingStatus::Full, true)]);

    let ran = app.run(|| Some(sensors.read_all()), &mut leds, &mut sink, Some(0), |_| {
        panic!("paced without a tick")
    });
    assert_eq!(ran, 0);
    assert_eq!(sensors.reads, 0);
    assert_eq!(app.tick_count(), 0);
}

#[test]
fn run_stops_at_tick_limit_without_trailing_pace() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(50, 3.8, 30.0, ChargingStatus::Full, true)]);

    let ran = app.run(|| Some(sensors.read_all()), &mut leds, &mut sink, Some(3), |l| {
        l.refresh(7)
    });
    assert_eq!(ran, 3);
    assert_eq!(sensors.reads, 3);
    assert_eq!(leds.refreshes, vec![7, 7]);
}

#[test]
fn run_stops_when_json_input_ends() {
    let (mut app, mut leds, mut sink) = make_app();
    let input = "{\"battery_percentage\": 90}\n\n{\"battery_percentage\": 40}\n";
    let mut src = JsonReadings::new(input.as_bytes());
    let mut paces = 0;

    let ran = app.run(|| src.next_readings(), &mut leds, &mut sink, Some(10), |_| paces += 1);
    assert_eq!(ran, 2);
    assert_eq!(paces, 1);
    assert_eq!(app.last_readings().percentage, 40);
    assert!(src.is_exhausted());
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn custom_pattern_shows_until_next_tick() {
    let (mut app, mut leds, mut sink) = make_app();
    app.handle_command(
        custom(&[("LED1", "PULSE"), ("LED3", "BLINK_FAST")]),
        &mut leds,
        &mut sink,
    )
    .unwrap();

    let expected = Pattern::ALL_OFF
        .with(LedId::LED1, LedState::Pulse)
        .with(LedId::LED3, LedState::BlinkFast);
    assert_eq!(app.current_pattern(), expected);
    assert_eq!(leds.last(), Some(expected));
    assert_eq!(
        app.current_status(),
        [
            (LedId::LED1, "PULSE"),
            (LedId::LED2, "OFF"),
            (LedId::LED3, "BLINK_FAST"),
            (LedId::LED4, "OFF"),
        ]
    );

    let mut sensors = ScriptedSensors::new([readings(
        90,
        3.9,
        30.0,
        ChargingStatus::Full,
        true,
    )]);
    app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(app.current_pattern(), Pattern::uniform(LedState::On));
}

#[test]
fn rejected_custom_pattern_changes_nothing() {
    let (mut app, mut leds, mut sink) = make_app();
    let mut sensors = ScriptedSensors::new([readings(
        30,
        3.75,
        30.0,
        ChargingStatus::Full,
        true,
    )]);
    let before = app.tick(&mut sensors, &mut leds, &mut sink);
    let shown = leds.shown.len();
    let events = sink.events.len();

    let err = app
        .handle_command(custom(&[("LED1", "ON"), ("LED9", "ON")]), &mut leds, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Pattern(PatternError::UnknownLed("LED9".into())));

    let err = app
        .handle_command(custom(&[("LED2", "FLICKER")]), &mut leds, &mut sink)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Pattern(PatternError::UnknownState { led: LedId::LED2, .. })
    ));

    assert_eq!(app.current_pattern(), before);
    assert_eq!(leds.shown.len(), shown);
    assert_eq!(sink.events.len(), events);
}

#[test]
fn clear_display_command() {
    let (mut app, mut leds, mut sink) = make_app();
    app.handle_command(custom(&[("LED4", "ON")]), &mut leds, &mut sink)
        .unwrap();
    app.handle_command(AppCommand::ClearDisplay, &mut leds, &mut sink)
        .unwrap();
    assert_eq!(app.current_pattern(), Pattern::ALL_OFF);
    assert_eq!(leds.last(), Some(Pattern::ALL_OFF));
}

#[test]
fn update_config_swaps_band_table() {
    let (mut app, mut leds, mut sink) = make_app();

    let mut cfg = MonitorConfig::default();
    cfg.battery_levels.clear();
    cfg.battery_levels
        .push(LevelBand::new("low", 0, 49, Pattern::uniform(LedState::BlinkSlow)))
        .unwrap();
    cfg.battery_levels
        .push(LevelBand::new("ok", 50, 100, Pattern::uniform(LedState::On)))
        .unwrap();

    app.handle_command(AppCommand::UpdateConfig(cfg.clone()), &mut leds, &mut sink)
        .unwrap();
    assert_eq!(app.config(), &cfg);
    assert!(sink.events.contains(&AppEvent::ConfigUpdated));

    let mut sensors = ScriptedSensors::new([readings(
        40,
        3.8,
        30.0,
        ChargingStatus::Full,
        true,
    )]);
    let p = app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(p, Pattern::uniform(LedState::BlinkSlow));
}

#[test]
fn timing_reaches_the_indicator() {
    let (mut app, mut leds, mut sink) = make_app();
    assert_eq!(leds.timings, vec![MonitorConfig::default().timing]);

    let mut cfg = MonitorConfig::default();
    cfg.timing.blink_fast.on_ms = 60;
    cfg.timing.refresh_rate_ms = 20;
    app.handle_command(AppCommand::UpdateConfig(cfg.clone()), &mut leds, &mut sink)
        .unwrap();
    assert_eq!(leds.timings.last(), Some(&cfg.timing));

    let mut bad = cfg.clone();
    bad.timing.blink_slow.off_ms = 0;
    assert!(
        app.handle_command(AppCommand::UpdateConfig(bad), &mut leds, &mut sink)
            .is_err()
    );
    assert_eq!(leds.timings.len(), 2);
}

#[test]
fn invalid_config_is_rejected_whole() {
    let (mut app, mut leds, mut sink) = make_app();

    let mut cfg = MonitorConfig::default();
    cfg.battery_levels[1].range = [7, 25];
    cfg.poll_interval_ms = 250;

    let err = app
        .handle_command(AppCommand::UpdateConfig(cfg), &mut leds, &mut sink)
        .unwrap_err();
    assert_eq!(
        err,
        Error::Config(ConfigError::ValidationFailed("gap between bands"))
    );
    assert_eq!(app.config(), &MonitorConfig::default());
    assert!(!sink.events.contains(&AppEvent::ConfigUpdated));
}

#[test]
fn update_config_moves_safety_limits() {
    let (mut app, mut leds, mut sink) = make_app();
    let r = readings(50, 3.6, 30.0, ChargingStatus::Full, true);
    let mut sensors = ScriptedSensors::new([r]);

    app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(app.fault_flags(), 0);

    let mut cfg = MonitorConfig::default();
    cfg.safety.low_voltage_v = 3.7;
    app.handle_command(AppCommand::UpdateConfig(cfg), &mut leds, &mut sink)
        .unwrap();
    app.tick(&mut sensors, &mut leds, &mut sink);
    assert_eq!(app.fault_flags(), SafetyFault::BatteryLow.mask());
}

// ── Self-test ─────────────────────────────────────────────────

struct NoDelay {
    calls: usize,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {
        self.calls += 1;
    }
}

#[test]
fn self_test_ends_dark() {
    let (app, mut leds, _sink) = make_app();
    let mut delay = NoDelay { calls: 0 };
    app.self_test(&mut leds, &mut delay);

    // start() + 6 steps + final clear
    assert_eq!(leds.shown.len(), 8);
    assert_eq!(leds.shown[5], Pattern::uniform(LedState::On));
    assert_eq!(leds.shown[6], Pattern::uniform(LedState::BlinkFast));
    assert_eq!(leds.last(), Some(Pattern::ALL_OFF));
    assert_eq!(app.current_pattern(), Pattern::ALL_OFF);
    assert!(delay.calls >= 6);
}
