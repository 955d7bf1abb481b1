//! LED identifiers, states, and the fixed four-entry [`Pattern`].
//!
//! A pattern is a total mapping from the four indicator LEDs to a
//! [`LedState`].  It is stored as a plain array so the "exactly four
//! entries, nothing outside 1..=4" rule holds by construction.
//!
//! [`PatternCell`] packs a whole pattern into one `AtomicU16` so the
//! current pattern can be published and read across threads without a
//! lock and without ever exposing a half-written value.

use core::fmt;
use core::sync::atomic::{AtomicU16, Ordering};

use serde::{Deserialize, Serialize};

/// Number of indicator LEDs on the UPS board.
pub const LED_COUNT: usize = 4;

// ───────────────────────────────────────────────────────────────
// LedState
// ───────────────────────────────────────────────────────────────

/// Drive state of a single indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedState {
    #[default]
    Off,
    On,
    BlinkSlow,
    BlinkFast,
    Pulse,
}

impl LedState {
    pub const ALL: [LedState; 5] = [
        LedState::Off,
        LedState::On,
        LedState::BlinkSlow,
        LedState::BlinkFast,
        LedState::Pulse,
    ];

    /// External text form (`OFF`, `ON`, `BLINK_SLOW`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::BlinkSlow => "BLINK_SLOW",
            Self::BlinkFast => "BLINK_FAST",
            Self::Pulse => "PULSE",
        }
    }

    /// Parse the external text form.  Exact match only.
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == text)
    }

    /// Single-glyph symbol for text renderers.
    pub const fn symbol(self) -> char {
        match self {
            Self::Off => '○',
            Self::On => '●',
            Self::BlinkSlow => '◐',
            Self::BlinkFast => '◑',
            Self::Pulse => '◒',
        }
    }

    const fn code(self) -> u16 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::BlinkSlow => 2,
            Self::BlinkFast => 3,
            Self::Pulse => 4,
        }
    }

    const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::On,
            2 => Self::BlinkSlow,
            3 => Self::BlinkFast,
            4 => Self::Pulse,
            _ => Self::Off,
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───────────────────────────────────────────────────────────────
// LedId
// ───────────────────────────────────────────────────────────────

/// Ordinal of an indicator LED, always in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedId(u8);

impl LedId {
    pub const LED1: LedId = LedId(1);
    pub const LED2: LedId = LedId(2);
    pub const LED3: LedId = LedId(3);
    pub const LED4: LedId = LedId(4);

    /// All ids in ascending ordinal order.
    pub const ALL: [LedId; LED_COUNT] = [Self::LED1, Self::LED2, Self::LED3, Self::LED4];

    /// Returns `None` for ordinals outside `1..=4`.
    pub const fn new(ordinal: u8) -> Option<Self> {
        if ordinal >= 1 && ordinal as usize <= LED_COUNT {
            Some(Self(ordinal))
        } else {
            None
        }
    }

    /// Parse exactly `LED1`..`LED4`.  Signs, padding and whitespace are
    /// rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LED1" => Some(Self::LED1),
            "LED2" => Some(Self::LED2),
            "LED3" => Some(Self::LED3),
            "LED4" => Some(Self::LED4),
            _ => None,
        }
    }

    pub const fn ordinal(self) -> u8 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for LedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED{}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Pattern
// ───────────────────────────────────────────────────────────────

/// State of all four LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "PatternRepr", into = "PatternRepr")]
pub struct Pattern([LedState; LED_COUNT]);

impl Pattern {
    /// Every LED off.
    pub const ALL_OFF: Pattern = Pattern::uniform(LedState::Off);

    /// Every LED in the same state.
    pub const fn uniform(state: LedState) -> Self {
        Self([state; LED_COUNT])
    }

    /// Build from states ordered LED1..LED4.
    pub const fn from_states(states: [LedState; LED_COUNT]) -> Self {
        Self(states)
    }

    /// States ordered LED1..LED4.
    pub const fn states(&self) -> [LedState; LED_COUNT] {
        self.0
    }

    pub const fn get(&self, id: LedId) -> LedState {
        self.0[id.index()]
    }

    pub fn set(&mut self, id: LedId, state: LedState) {
        self.0[id.index()] = state;
    }

    /// Copy with one LED changed.
    #[must_use]
    pub fn with(mut self, id: LedId, state: LedState) -> Self {
        self.set(id, state);
        self
    }

    /// `(id, state)` pairs in ascending ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (LedId, LedState)> {
        let states = self.0;
        LedId::ALL.into_iter().map(move |id| (id, states[id.index()]))
    }

    /// Copy with every LED currently in `from` switched to `to`.
    #[must_use]
    pub fn replace_all(self, from: LedState, to: LedState) -> Self {
        Self(self.0.map(|s| if s == from { to } else { s }))
    }

    /// Highest-ordinal LED currently in `state`.
    pub fn highest_in(&self, state: LedState) -> Option<LedId> {
        LedId::ALL.into_iter().rev().find(|id| self.get(*id) == state)
    }

    /// Number of LEDs in `state`.
    pub fn count(&self, state: LedState) -> usize {
        self.0.iter().filter(|s| **s == state).count()
    }

    fn pack(self) -> u16 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |acc, (i, s)| acc | (s.code() << (i * 3)))
    }

    fn unpack(bits: u16) -> Self {
        let mut states = [LedState::Off; LED_COUNT];
        for (i, slot) in states.iter_mut().enumerate() {
            *slot = LedState::from_code((bits >> (i * 3)) & 0b111);
        }
        Self(states)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, state)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{id}={state}")?;
        }
        Ok(())
    }
}

/// Wire shape: an object with exactly the keys `LED1`..`LED4`.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternRepr {
    #[serde(rename = "LED1")]
    led1: LedState,
    #[serde(rename = "LED2")]
    led2: LedState,
    #[serde(rename = "LED3")]
    led3: LedState,
    #[serde(rename = "LED4")]
    led4: LedState,
}

impl From<PatternRepr> for Pattern {
    fn from(r: PatternRepr) -> Self {
        Self([r.led1, r.led2, r.led3, r.led4])
    }
}

impl From<Pattern> for PatternRepr {
    fn from(p: Pattern) -> Self {
        let [led1, led2, led3, led4] = p.0;
        Self {
            led1,
            led2,
            led3,
            led4,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// PatternCell
// ───────────────────────────────────────────────────────────────

/// Lock-free holder for the current pattern.
///
/// The four states are packed 3 bits apiece into one `AtomicU16`, so
/// every store replaces the whole pattern in a single atomic write.
pub struct PatternCell(AtomicU16);

impl PatternCell {
    pub fn new(initial: Pattern) -> Self {
        Self(AtomicU16::new(initial.pack()))
    }

    pub fn load(&self) -> Pattern {
        Pattern::unpack(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, pattern: Pattern) {
        self.0.store(pattern.pack(), Ordering::Release);
    }

    /// Publish `pattern` and return the one it replaced.
    pub fn swap(&self, pattern: Pattern) -> Pattern {
        Pattern::unpack(self.0.swap(pattern.pack(), Ordering::AcqRel))
    }
}

impl Default for PatternCell {
    fn default() -> Self {
        Self::new(Pattern::ALL_OFF)
    }
}

impl fmt::Debug for PatternCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PatternCell").field(&self.load()).finish()
    }
}
