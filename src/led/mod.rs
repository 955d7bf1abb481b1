//! Battery-indicator LED logic.
//!
//! - [`pattern`]: LED ids, states and the four-LED [`Pattern`].
//! - [`resolver`]: maps one [`Readings`](crate::sensors::Readings)
//!   snapshot to a pattern.
//! - [`manager`]: publishes the current pattern and handles custom
//!   patterns and the self-test.

pub mod manager;
pub mod pattern;
pub mod resolver;

pub use manager::LedManager;
pub use pattern::{LedId, LedState, Pattern, PatternCell};
pub use resolver::{LedResolver, LevelBand};
