//! Text indicator adapter.
//!
//! Renders each new pattern as one line of LED symbols on any
//! `io::Write`, e.g. `LED1:● LED2:● LED3:◐ LED4:○`.  Repeated patterns
//! are not redrawn.

use std::io::Write;

use log::{debug, warn};

use crate::app::ports::IndicatorPort;
use crate::led::pattern::Pattern;

pub struct ConsoleLeds<W> {
    out: W,
    last: Option<Pattern>,
}

impl<W: Write> ConsoleLeds<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    /// One-line rendering of `pattern`.
    pub fn render(pattern: &Pattern) -> String {
        pattern
            .iter()
            .map(|(id, state)| format!("{id}:{}", state.symbol()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleLeds<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> IndicatorPort for ConsoleLeds<W> {
    fn show(&mut self, pattern: Pattern) {
        if self.last == Some(pattern) {
            return;
        }
        self.last = Some(pattern);
        debug!("console leds: {pattern}");
        let line = Self::render(&pattern);
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("console leds: write failed: {e}");
        }
    }
}
