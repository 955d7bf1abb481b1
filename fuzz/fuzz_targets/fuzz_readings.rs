//! Fuzz target: lenient readings decoder → resolver
//!
//! Feeds arbitrary bytes through the JSON readings path and checks:
//! - No panics, whatever the field types or magnitudes
//! - Every resolved pattern is one of the states the LEDs can show
//! - Out-of-range percentages never light a band
//!
//! cargo fuzz run fuzz_readings

#![no_main]

use libfuzzer_sys::fuzz_target;
use upsmon::led::pattern::{LedState, Pattern};
use upsmon::led::resolver::{CRITICAL_VOLTAGE_V, LedResolver};
use upsmon::sensors::Readings;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let readings = Readings::from_value(&value);
    let resolver = LedResolver::default();
    let pattern = resolver.resolve(&readings);

    assert_eq!(pattern, resolver.resolve(&readings));
    for (_, state) in pattern.iter() {
        assert!(LedState::ALL.contains(&state));
    }
    if readings.voltage_v < CRITICAL_VOLTAGE_V {
        assert_eq!(pattern, Pattern::uniform(LedState::BlinkFast));
    }
    if !(0..=100).contains(&readings.percentage) {
        assert_eq!(resolver.level_pattern(readings.percentage), Pattern::ALL_OFF);
    }
});
