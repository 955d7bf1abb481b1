//! LED manager: owns the resolver and the published pattern.
//!
//! ```text
//!   Readings ──▶ LedResolver ──▶ PatternCell ──▶ readers (any thread)
//!                                    ▲
//!   custom pattern / clear ──────────┘
//! ```
//!
//! All mutation goes through `&self`: the current pattern lives in a
//! [`PatternCell`], so a single manager can be shared between the poll
//! loop and any number of status readers.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use super::pattern::{LED_COUNT, LedId, LedState, Pattern, PatternCell};
use super::resolver::LedResolver;
use crate::app::ports::IndicatorPort;
use crate::config::MonitorConfig;
use crate::error::PatternError;
use crate::sensors::Readings;

/// One step of the LED self-test: show `pattern` for `hold_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestStep {
    pub pattern: Pattern,
    pub hold_ms: u32,
}

const SELF_TEST_SINGLE_MS: u32 = 500;
const SELF_TEST_ALL_ON_MS: u32 = 1000;
const SELF_TEST_BLINK_MS: u32 = 2000;

#[derive(Debug, Default)]
pub struct LedManager {
    resolver: LedResolver,
    current: PatternCell,
}

impl LedManager {
    /// Start with every LED off.
    pub fn new(resolver: LedResolver) -> Self {
        Self {
            resolver,
            current: PatternCell::default(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(LedResolver::new(config.battery_levels.clone()))
    }

    pub fn resolver(&self) -> &LedResolver {
        &self.resolver
    }

    /// Replace the band table.  The published pattern is kept until the
    /// next [`update_display`](Self::update_display).
    pub fn set_resolver(&mut self, resolver: LedResolver) {
        self.resolver = resolver;
    }

    /// Resolve `readings` and publish the result.
    pub fn update_display(&self, readings: &Readings) -> Pattern {
        let pattern = self.resolver.resolve(readings);
        let prev = self.current.swap(pattern);
        if prev != pattern {
            debug!("LED pattern {prev} -> {pattern}");
        }
        pattern
    }

    pub fn current_pattern(&self) -> Pattern {
        self.current.load()
    }

    /// Current pattern as `(LED, state text)` pairs, LED1 first.
    pub fn current_status(&self) -> [(LedId, &'static str); LED_COUNT] {
        let p = self.current.load();
        LedId::ALL.map(|id| (id, p.get(id).as_str()))
    }

    /// Validate and publish a hand-picked pattern.
    ///
    /// LEDs not named are off; a repeated name keeps its last value.  On
    /// error nothing is published.
    pub fn set_custom_pattern<I, N, S>(&self, entries: I) -> Result<Pattern, PatternError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut pattern = Pattern::ALL_OFF;
        for (name, text) in entries {
            let (name, text) = (name.as_ref(), text.as_ref());
            let led =
                LedId::from_name(name).ok_or_else(|| PatternError::UnknownLed(name.to_owned()))?;
            let state = LedState::parse(text).ok_or_else(|| PatternError::UnknownState {
                led,
                value: text.to_owned(),
            })?;
            pattern.set(led, state);
        }
        self.current.store(pattern);
        info!("Custom LED pattern set: {pattern}");
        Ok(pattern)
    }

    pub fn clear_display(&self) {
        self.current.store(Pattern::ALL_OFF);
    }

    /// Steps of the self-test, in order: each LED alone, all on, all
    /// fast-blinking.
    pub fn self_test_sequence() -> impl Iterator<Item = TestStep> {
        let singles = LedId::ALL.into_iter().map(|id| TestStep {
            pattern: Pattern::ALL_OFF.with(id, LedState::On),
            hold_ms: SELF_TEST_SINGLE_MS,
        });
        singles.chain([
            TestStep {
                pattern: Pattern::uniform(LedState::On),
                hold_ms: SELF_TEST_ALL_ON_MS,
            },
            TestStep {
                pattern: Pattern::uniform(LedState::BlinkFast),
                hold_ms: SELF_TEST_BLINK_MS,
            },
        ])
    }

    /// Walk the self-test on `out`, then leave everything off.
    ///
    /// The published pattern tracks each step so status readers see what
    /// the LEDs show.
    pub fn run_self_test(&self, out: &mut impl IndicatorPort, delay: &mut impl DelayNs) {
        info!("LED self-test starting");
        for step in Self::self_test_sequence() {
            self.current.store(step.pattern);
            out.show(step.pattern);
            delay.delay_ms(step.hold_ms);
        }
        self.clear_display();
        out.show(Pattern::ALL_OFF);
        info!("LED self-test complete");
    }
}
