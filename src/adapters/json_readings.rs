//! Line-delimited JSON sensor source.
//!
//! Implements [`SensorPort`] over any `BufRead`: each tick consumes one
//! line holding a readings object such as
//! `{"battery_percentage": 80, "battery_voltage": 3.95, "ac_present": true}`.
//! Fields are decoded leniently by [`Readings::from_value`].
//!
//! A line that is not JSON repeats the previous snapshot so the display
//! holds steady.  [`next_readings`](JsonReadings::next_readings) reports
//! end of input as `None`; through [`SensorPort`] it repeats the last
//! snapshot as well.

use std::io::BufRead;

use log::{debug, warn};

use crate::app::ports::SensorPort;
use crate::sensors::Readings;

pub struct JsonReadings<R> {
    input: R,
    last: Readings,
    exhausted: bool,
    line: String,
}

impl<R: BufRead> JsonReadings<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            last: Readings::default(),
            exhausted: false,
            line: String::new(),
        }
    }

    /// True once the input has hit end-of-file or failed.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Consume the next non-empty line.  `None` once the input is spent.
    pub fn next_readings(&mut self) -> Option<Readings> {
        if self.exhausted {
            return None;
        }
        loop {
            self.line.clear();
            match self.input.read_line(&mut self.line) {
                Ok(0) => {
                    debug!("JsonReadings: end of input");
                    self.exhausted = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("JsonReadings: read failed: {e}");
                    self.exhausted = true;
                    return None;
                }
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value) => {
                    self.last = Readings::from_value(&value);
                }
                Err(e) => warn!("JsonReadings: skipping bad line: {e}"),
            }
            return Some(self.last);
        }
    }
}

impl<R: BufRead> SensorPort for JsonReadings<R> {
    fn read_all(&mut self) -> Readings {
        self.next_readings().unwrap_or(self.last)
    }
}
