//! Absolute-deadline timers for the cooperative polling loop.
//!
//! Nothing here sleeps.  Every timer is polled with the current uptime in
//! milliseconds and reports whether it fired on that poll.  Late polls
//! fire once (no catch-up bursts), which matches the loop's "next tick
//! boundary" timing.
//!
//! ```text
//!   OneShot   ── arm_at(t) ──▶ armed ── poll(now ≥ t) ──▶ fired (disarmed)
//!   Periodic  ── start(now) ─▶ due at now+T ── poll ──▶ due at poll+T ...
//! ```

/// A single deadline that fires at most once per arming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShot {
    deadline_ms: Option<u64>,
}

impl OneShot {
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Arm (or re-arm) the timer for an absolute deadline.
    pub fn arm_at(&mut self, deadline_ms: u64) {
        self.deadline_ms = Some(deadline_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    DueNow,
    DueAt(u64),
}

/// A recurring interval timer.
///
/// After firing, the next deadline is counted from the poll that fired,
/// so a late loop iteration shifts the schedule rather than bunching up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    interval_ms: u64,
    phase: Phase,
}

impl Periodic {
    /// A stopped timer.  Call [`start`](Self::start) or
    /// [`start_immediately`](Self::start_immediately) to run it.
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            phase: Phase::Stopped,
        }
    }

    /// First fire one interval after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.phase = Phase::DueAt(now_ms.saturating_add(self.interval_ms));
    }

    /// First fire on the very next poll.
    pub fn start_immediately(&mut self) {
        self.phase = Phase::DueNow;
    }

    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Stopped
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns `true` if the timer is due; reschedules from `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let due = match self.phase {
            Phase::Stopped => false,
            Phase::DueNow => true,
            Phase::DueAt(at) => now_ms >= at,
        };
        if due {
            self.phase = Phase::DueAt(now_ms.saturating_add(self.interval_ms));
        }
        due
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
