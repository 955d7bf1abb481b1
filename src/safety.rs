//! Safety supervisor.
//!
//! The supervisor runs **every tick before the LED update** and keeps a
//! latched fault bitmask.  It never touches the LED pattern itself; the
//! resolver's safety stage is independent.  The mask feeds events,
//! telemetry and the `is_safe` query.
//!
//! ## Fault lifecycle
//!
//! 1. A reading crosses a threshold (e.g. battery below 3.5 V).
//! 2. The supervisor sets the corresponding bit and logs it once.
//! 3. Each tick the supervisor re-evaluates.  When the condition clears
//!    it unsets the bit and logs that too.
//!
//! Warning and critical bands are exclusive: a battery below the
//! critical cutoff raises `BatteryCritical` only, not `BatteryLow` as well.

use crate::config::SafetyConfig;
use crate::error::SafetyFault;
use crate::sensors::Readings;
use log::{error, info, warn};

/// Faults split by severity, as reported by [`SafetySupervisor::status`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafetyStatus {
    pub safe: bool,
    pub warnings: heapless::Vec<SafetyFault, 4>,
    pub critical: heapless::Vec<SafetyFault, 4>,
}

/// Safety supervisor.
#[derive(Debug, Clone)]
pub struct SafetySupervisor {
    limits: SafetyConfig,
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(limits: &SafetyConfig) -> Self {
        Self {
            limits: *limits,
            faults: 0,
        }
    }

    /// Swap in new thresholds.  Latched faults are re-evaluated on the
    /// next call to [`evaluate`](Self::evaluate).
    pub fn set_limits(&mut self, limits: &SafetyConfig) {
        self.limits = *limits;
    }

    /// Evaluate all safety conditions against the latest readings.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, readings: &Readings) -> u8 {
        let l = self.limits;
        let v = readings.voltage_v;
        let t = readings.temperature_c;

        // ── Battery voltage ───────────────────────────────────────
        let critical = v < l.critical_voltage_v;
        self.eval_fault(SafetyFault::BatteryCritical, critical);
        self.eval_fault(SafetyFault::BatteryLow, !critical && v < l.low_voltage_v);

        // ── Temperature ───────────────────────────────────────────
        let too_hot = t > l.max_temperature_c;
        self.eval_fault(SafetyFault::OverTemperature, too_hot);
        self.eval_fault(
            SafetyFault::TemperatureElevated,
            !too_hot && t > l.warn_temperature_c,
        );

        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active, warnings included.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// True when no critical fault is active.
    pub fn is_safe(&self) -> bool {
        !SafetyFault::in_mask(self.faults).any(SafetyFault::is_critical)
    }

    pub fn status(&self) -> SafetyStatus {
        let mut status = SafetyStatus {
            safe: self.is_safe(),
            ..SafetyStatus::default()
        };
        for fault in SafetyFault::in_mask(self.faults) {
            let list = if fault.is_critical() {
                &mut status.critical
            } else {
                &mut status.warnings
            };
            // Capacity equals the number of fault kinds.
            let _ = list.push(fault);
        }
        status
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        let active = self.faults & fault.mask() != 0;
        if condition {
            if !active {
                if fault.is_critical() {
                    error!("SAFETY FAULT SET: {fault}");
                } else {
                    warn!("SAFETY WARNING SET: {fault}");
                }
            }
            self.faults |= fault.mask();
        } else {
            if active {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
