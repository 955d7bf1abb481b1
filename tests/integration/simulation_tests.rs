//! End-to-end runs: real sensor sources and the PWM LED bank driven by
//! the service.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use upsmon::adapters::JsonReadings;
use upsmon::app::commands::AppCommand;
use upsmon::app::events::AppEvent;
use upsmon::app::ports::IndicatorPort;
use upsmon::app::service::MonitorService;
use upsmon::config::{BlinkPeriod, BlinkTiming, MonitorConfig};
use upsmon::drivers::LedBank;
use upsmon::drivers::led_bank::duty_percent;
use upsmon::led::pattern::{LedState, Pattern};
use upsmon::sensors::{ChargingStatus, SimulatedUps};

use super::mock_hw::{LogSink, RecordingLeds};

#[derive(Default)]
struct Channel {
    duty: u16,
}

impl ErrorType for Channel {
    type Error = Infallible;
}

impl SetDutyCycle for Channel {
    fn max_duty_cycle(&self) -> u16 {
        1000
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        Ok(())
    }
}

#[test]
fn simulated_mains_cycle() {
    let mut app = MonitorService::new(MonitorConfig::default());
    let mut leds = RecordingLeds::new();
    let mut sink = LogSink::new();
    let mut ups = SimulatedUps::new(10);
    app.start(&mut leds, &mut sink);

    let mut saw_pulse = false;
    let mut saw_slow_blink = false;
    for _ in 0..20 {
        let p = app.tick(&mut ups, &mut leds, &mut sink);
        let r = *app.last_readings();
        match r.charging_status {
            ChargingStatus::Charging => {
                assert_eq!(p.count(LedState::On), 0, "charging shows no solid LEDs: {p}");
                saw_pulse |= p.count(LedState::Pulse) > 0;
            }
            ChargingStatus::Discharging => {
                assert!(!r.ac_present);
                assert_eq!(p.count(LedState::BlinkSlow), 1, "on battery: {p}");
                saw_slow_blink = true;
            }
            _ => {}
        }
    }
    assert!(saw_pulse);
    assert!(saw_slow_blink);
    assert!(sink.count(|e| matches!(e, AppEvent::PatternChanged { .. })) >= 2);
}

#[test]
fn json_readings_through_service() {
    let input = "\
{\"battery_percentage\": 90, \"battery_voltage\": 3.9, \"temperature\": 30, \"charging_status\": \"CHARGING\", \"ac_present\": true}
{\"battery_percentage\": 3, \"battery_voltage\": 3.0, \"charging_status\": \"DISCHARGING\", \"ac_present\": false}
{\"battery_percentage\": \"lots\", \"charging_status\": 7}
";
    let mut src = JsonReadings::new(input.as_bytes());
    let mut app = MonitorService::new(MonitorConfig::default());
    let mut leds = RecordingLeds::new();
    let mut sink = LogSink::new();

    assert_eq!(
        app.tick(&mut src, &mut leds, &mut sink),
        Pattern::uniform(LedState::Pulse)
    );
    assert_eq!(
        app.tick(&mut src, &mut leds, &mut sink),
        Pattern::uniform(LedState::BlinkFast)
    );
    // Wrong-typed fields fall back to defaults: 0% → critical band.
    assert_eq!(
        app.tick(&mut src, &mut leds, &mut sink).states(),
        [LedState::BlinkFast, LedState::Off, LedState::Off, LedState::Off]
    );
}

#[test]
fn led_bank_follows_service() {
    let mut app = MonitorService::new(MonitorConfig::default());
    let mut bank: LedBank<Channel> = LedBank::new(Default::default(), BlinkTiming::default());
    let mut sink = LogSink::new();
    let mut ups = SimulatedUps::new(0).with_voltage(3.4);
    app.start(&mut bank, &mut sink);

    let p = app.tick(&mut ups, &mut bank, &mut sink);
    assert_eq!(bank.pattern(), p);

    // Charging at ~3.42 V (low band): LED1 pulses, the rest are dark.
    assert_eq!(
        p.states(),
        [LedState::Pulse, LedState::Off, LedState::Off, LedState::Off]
    );
    bank.refresh(1000).unwrap();
    let duties = bank.release().map(|c| c.duty);
    assert_eq!(duties, [1000, 0, 0, 0]);
}

#[test]
fn config_update_retimes_led_bank() {
    let mut app = MonitorService::new(MonitorConfig::default());
    let mut bank: LedBank<Channel> = LedBank::new(Default::default(), BlinkTiming::default());
    let mut sink = LogSink::new();
    let mut ups = SimulatedUps::new(0).with_voltage(3.0).with_ac(false);
    app.start(&mut bank, &mut sink);

    assert_eq!(
        app.tick(&mut ups, &mut bank, &mut sink),
        Pattern::uniform(LedState::BlinkFast)
    );
    // Stock fast blink is 125/125: lit at 500 ms.
    assert_eq!(duty_percent(LedState::BlinkFast, 500, &BlinkTiming::default()), 100);

    let mut cfg = MonitorConfig::default();
    cfg.timing.blink_fast = BlinkPeriod {
        on_ms: 100,
        off_ms: 900,
    };
    app.handle_command(AppCommand::UpdateConfig(cfg), &mut bank, &mut sink)
        .unwrap();
    app.tick(&mut ups, &mut bank, &mut sink);
    IndicatorPort::refresh(&mut bank, 500);

    let duties = bank.release().map(|c| c.duty);
    assert_eq!(duties, [0; 4]);
}
