//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (a control
//! socket, a diagnostic CLI, tests) that the
//! [`MonitorService`](super::service::MonitorService) interprets and
//! acts upon.

use crate::config::MonitorConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Show a hand-picked pattern until the next tick.  Entries are
    /// `(led name, state text)` pairs such as `("LED1", "BLINK_FAST")`.
    SetCustomPattern(Vec<(String, String)>),

    /// Turn every LED off.
    ClearDisplay,

    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(MonitorConfig),
}
