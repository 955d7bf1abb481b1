//! Four-channel PWM driver for the battery-indicator LEDs.
//!
//! Each LED sits on its own PWM channel.  The bank latches the last
//! [`Pattern`] it was shown and turns it into duty cycles on every
//! [`refresh`](LedBank::refresh):
//!
//! | State        | Output                                   |
//! |-------------|------------------------------------------|
//! | Off          | 0 %                                      |
//! | On           | 100 %                                    |
//! | BlinkSlow    | square wave, `blink_slow` on/off         |
//! | BlinkFast    | square wave, `blink_fast` on/off         |
//! | Pulse        | triangle ramp 0→100→0 over `pulse_period` |
//!
//! Timing is derived from the caller's millisecond clock, so all four
//! channels stay in phase.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::IndicatorPort;
use crate::config::{BlinkPeriod, BlinkTiming};
use crate::led::pattern::{LED_COUNT, LedState, Pattern};

pub struct LedBank<P> {
    channels: [P; LED_COUNT],
    timing: BlinkTiming,
    pattern: Pattern,
}

impl<P: SetDutyCycle> LedBank<P> {
    /// Channels are ordered LED1..LED4.
    pub fn new(channels: [P; LED_COUNT], timing: BlinkTiming) -> Self {
        Self {
            channels,
            timing,
            pattern: Pattern::ALL_OFF,
        }
    }

    /// Latch a new pattern.  Takes effect on the next refresh.
    pub fn show(&mut self, pattern: Pattern) {
        self.pattern = pattern;
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn set_timing(&mut self, timing: BlinkTiming) {
        self.timing = timing;
    }

    /// Write the latched pattern to every channel at time `now_ms`.
    pub fn refresh(&mut self, now_ms: u32) -> Result<(), P::Error> {
        let states = self.pattern.states();
        for (ch, state) in self.channels.iter_mut().zip(states) {
            ch.set_duty_cycle_percent(duty_percent(state, now_ms, &self.timing))?;
        }
        Ok(())
    }

    /// Drive every channel to 0 % without touching the latched pattern.
    pub fn all_off(&mut self) -> Result<(), P::Error> {
        for ch in &mut self.channels {
            ch.set_duty_cycle_fully_off()?;
        }
        Ok(())
    }

    /// Give the channels back.
    pub fn release(self) -> [P; LED_COUNT] {
        self.channels
    }
}

impl<P: SetDutyCycle> IndicatorPort for LedBank<P> {
    fn show(&mut self, pattern: Pattern) {
        LedBank::show(self, pattern);
    }

    fn set_timing(&mut self, timing: &BlinkTiming) {
        LedBank::set_timing(self, *timing);
    }

    fn refresh(&mut self, now_ms: u32) {
        if let Err(e) = LedBank::refresh(self, now_ms) {
            warn!("LED refresh failed: {e:?}");
        }
    }
}

/// Brightness of one LED in `state` at `now_ms`, in percent.
pub fn duty_percent(state: LedState, now_ms: u32, timing: &BlinkTiming) -> u8 {
    match state {
        LedState::Off => 0,
        LedState::On => 100,
        LedState::BlinkSlow => square(now_ms, &timing.blink_slow),
        LedState::BlinkFast => square(now_ms, &timing.blink_fast),
        LedState::Pulse => {
            let level = triangle_brightness(now_ms, timing.pulse_period_ms);
            ((u16::from(level) * 100) / 255) as u8
        }
    }
}

fn square(now_ms: u32, period: &BlinkPeriod) -> u8 {
    let total = period.period_ms();
    if total == 0 {
        return 0;
    }
    if now_ms % total < period.on_ms { 100 } else { 0 }
}

/// Ramps 0→255→0 over `period_ms`.
fn triangle_brightness(phase_ms: u32, period_ms: u32) -> u8 {
    let half = u64::from(period_ms / 2);
    if half == 0 {
        return 0;
    }
    let pos = u64::from(phase_ms % period_ms);
    if pos < half {
        ((pos * 255) / half) as u8
    } else {
        (((u64::from(period_ms) - pos) * 255) / half).min(255) as u8
    }
}
