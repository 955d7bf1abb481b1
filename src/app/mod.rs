//! Application layer: hexagonal architecture core.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────┐
//!  │                  MonitorService                    │
//!  │  (Safety · LedManager · config · telemetry)        │
//!  └────┬──────────────┬──────────────┬────────────────┘
//!       │              │              │
//!  SensorPort    IndicatorPort    EventSink
//!       │              │              │
//!  ┌────┴────┐  ┌──────┴──────┐  ┌───┴────────┐
//!  │Simulated│  │ LedBank /   │  │ LogEvent   │
//!  │  UPS    │  │ Console     │  │ Sink       │
//!  └─────────┘  └─────────────┘  └────────────┘
//! ```

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
