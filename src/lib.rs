//! UPS status LED library.
//!
//! Maps battery readings from a single-board-computer UPS module onto
//! four indicator LEDs, and carries the monitor loop, safety supervisor
//! and adapters around that mapping.  Everything here is pure logic
//! behind port traits, so it is exercised on the host by the
//! integration tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod analytics;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod led;
pub mod safety;
pub mod sensors;

pub use error::{Error, Result};
