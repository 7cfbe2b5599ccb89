//! Outage detector.
//!
//! Compares the secondary rail voltage against a fixed threshold on every
//! fresh reading and reports **edges** only:
//!
//! 1. `secondary < threshold` while inactive → [`OutageEdge::Began`];
//!    the onset time and primary voltage are latched and the energy
//!    integrator restarts.
//! 2. `secondary ≥ threshold` while active → [`OutageEdge::Ended`]; the
//!    final interval is integrated and an [`OutageReport`] is frozen.
//!
//! Repeated readings on the same side of the threshold produce nothing.

use log::{info, warn};

use super::energy::EnergyIntegrator;
use crate::readings::ReadingSet;

/// Snapshot taken at outage onset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutageOnset {
    pub at_ms: u64,
    pub primary_voltage_v: f32,
    pub secondary_voltage_v: f32,
}

/// Summary of a finished outage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutageReport {
    pub duration_ms: u64,
    pub start_voltage_v: f32,
    pub end_voltage_v: f32,
    /// `start_voltage_v - end_voltage_v`.
    pub drop_v: f32,
    pub energy_mwh: f32,
}

/// Edge transitions emitted by [`OutageDetector::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutageEdge {
    Began(OutageOnset),
    Ended(OutageReport),
}

/// Latched outage bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutageState {
    pub active: bool,
    pub onset_ms: u64,
    pub start_voltage_v: f32,
    pub end_voltage_v: f32,
}

pub struct OutageDetector {
    threshold_v: f32,
    state: OutageState,
    energy: EnergyIntegrator,
}

impl OutageDetector {
    pub fn new(threshold_v: f32) -> Self {
        Self {
            threshold_v,
            state: OutageState::default(),
            energy: EnergyIntegrator::new(),
        }
    }

    /// Evaluate one fresh reading taken at `now_ms`.
    ///
    /// While an outage stays active the primary rail power is integrated;
    /// the integration for the closing interval happens before the report
    /// is frozen.
    pub fn evaluate(&mut self, reading: &ReadingSet, now_ms: u64) -> Option<OutageEdge> {
        let below = reading.secondary.voltage_v() < self.threshold_v;

        match (self.state.active, below) {
            (false, true) => {
                self.state.active = true;
                self.state.onset_ms = now_ms;
                self.state.start_voltage_v = reading.primary.voltage_v();
                self.energy.restart(now_ms);
                warn!(
                    "OUTAGE BEGAN: secondary {:.3} V < {:.2} V (primary {:.3} V)",
                    reading.secondary.voltage_v(),
                    self.threshold_v,
                    reading.primary.voltage_v()
                );
                Some(OutageEdge::Began(OutageOnset {
                    at_ms: now_ms,
                    primary_voltage_v: reading.primary.voltage_v(),
                    secondary_voltage_v: reading.secondary.voltage_v(),
                }))
            }
            (true, false) => {
                self.energy.accumulate(reading.primary.power_mw(), now_ms);
                self.state.active = false;
                self.state.end_voltage_v = reading.primary.voltage_v();
                let report = OutageReport {
                    duration_ms: now_ms.saturating_sub(self.state.onset_ms),
                    start_voltage_v: self.state.start_voltage_v,
                    end_voltage_v: self.state.end_voltage_v,
                    drop_v: self.state.start_voltage_v - self.state.end_voltage_v,
                    energy_mwh: self.energy.total_mwh(),
                };
                info!(
                    "OUTAGE ENDED: {} ms, {:.2} mWh",
                    report.duration_ms, report.energy_mwh
                );
                Some(OutageEdge::Ended(report))
            }
            (true, true) => {
                self.energy.accumulate(reading.primary.power_mw(), now_ms);
                None
            }
            (false, false) => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn state(&self) -> OutageState {
        self.state
    }

    /// Energy accumulated in the current (or most recent) outage.
    pub fn energy_mwh(&self) -> f32 {
        self.energy.total_mwh()
    }
}
