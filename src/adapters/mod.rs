//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements     | Connects to                  |
//! |-----------------|----------------|------------------------------|
//! | `config_file`   | ConfigPort     | JSON file on disk            |
//! | `console_leds`  | IndicatorPort  | Symbol lines on a terminal   |
//! | `json_readings` | SensorPort     | Line-delimited JSON input    |
//! | `log_sink`      | EventSink      | `log` facade                 |
//!
//! The PWM output lives in [`drivers::led_bank`](crate::drivers::led_bank)
//! and the simulated UPS in [`sensors::simulated`](crate::sensors::simulated).

pub mod config_file;
pub mod console_leds;
pub mod json_readings;
pub mod log_sink;

pub use config_file::JsonConfigFile;
pub use console_leds::ConsoleLeds;
pub use json_readings::JsonReadings;
pub use log_sink::LogEventSink;
