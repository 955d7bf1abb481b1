//! Output drivers.

pub mod led_bank;

pub use led_bank::LedBank;
