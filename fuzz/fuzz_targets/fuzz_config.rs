//! Fuzz target: config parsing and validation
//!
//! Any config that parses and validates must drive the resolver over
//! the whole 0..=100 range with exactly one band per percentage.
//!
//! cargo fuzz run fuzz_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use upsmon::config::MonitorConfig;
use upsmon::led::LedResolver;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = serde_json::from_slice::<MonitorConfig>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    let resolver = LedResolver::new(cfg.battery_levels.clone());
    for p in 0..=100 {
        let hits = resolver.bands().iter().filter(|b| b.contains(p)).count();
        assert_eq!(hits, 1, "percentage {p} matched {hits} bands");
        assert!(resolver.band_for(p).is_some());
    }
});
