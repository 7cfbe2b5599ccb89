//! Shared mutable context threaded through every sequencer handler.
//!
//! `SequencerContext` is the blackboard the state handlers read from and
//! write to: the current time, the latched onset and deadlines, the two
//! one-shot flags, and the output changes requested during this tick.
//! The service drains the requests after each call and applies them
//! through the actuator port.

use crate::config::SystemConfig;
use crate::timers::OneShot;

// ---------------------------------------------------------------------------
// Requested output changes (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Output changes requested by the sequencer during one call.
///
/// `None` means "leave the output alone".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerRequests {
    /// Drive the system relay to the given logical state.
    pub system_relay: Option<bool>,
    /// Drive the auxiliary relay to the given logical state.
    pub aux_relay: Option<bool>,
    /// Fire one short invert-and-restore pulse on the auxiliary relay.
    pub aux_pulse: bool,
}

impl SequencerRequests {
    pub fn is_empty(&self) -> bool {
        self.system_relay.is_none() && self.aux_relay.is_none() && !self.aux_pulse
    }
}

// ---------------------------------------------------------------------------
// SequencerContext
// ---------------------------------------------------------------------------

pub struct SequencerContext {
    // -- Timing --
    /// Uptime of the current call (ms).  Set by the engine wrapper.
    pub now_ms: u64,
    /// Uptime at which the current emergency window began.
    pub onset_ms: u64,
    /// Fires the delayed auxiliary pulse.
    pub pulse_deadline: OneShot,

    // -- One-shot flags --
    /// True from onset until the window closes (or an outage end preempts it).
    pub emergency_active: bool,
    /// True once the delayed pulse has fired for the current onset.
    pub aux_pulse_fired: bool,

    // -- Outputs --
    pub requests: SequencerRequests,

    // -- Configuration --
    pub aux_pulse_delay_ms: u64,
    pub emergency_window_ms: u64,
}

impl SequencerContext {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            now_ms: 0,
            onset_ms: 0,
            pulse_deadline: OneShot::new(),
            emergency_active: false,
            aux_pulse_fired: false,
            requests: SequencerRequests::default(),
            aux_pulse_delay_ms: config.aux_pulse_delay_ms,
            emergency_window_ms: config.emergency_window_ms,
        }
    }

    /// Milliseconds since the current onset.
    pub fn elapsed_since_onset(&self) -> u64 {
        self.now_ms.saturating_sub(self.onset_ms)
    }

    /// Whether the emergency window counted from onset has run out.
    pub fn window_elapsed(&self) -> bool {
        self.elapsed_since_onset() >= self.emergency_window_ms
    }

    /// Take and clear the requests accumulated so far.
    pub fn take_requests(&mut self) -> SequencerRequests {
        core::mem::take(&mut self.requests)
    }
}
