//! Emergency light policy.
//!
//! Automatic control switches the light on when the ambient level is
//! below a threshold.  An explicit ON/OFF command latches manual mode,
//! which only an AUTO command clears; while latched the policy is never
//! consulted and the light keeps whatever state the command set.
//!
//! During an outage the policy is re-evaluated on a recurring 20 s check
//! that runs from onset until the outage ends.

use crate::timers::Periodic;

/// What the policy wants done with the emergency light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightDecision {
    On,
    Off,
    /// Manual override latched: leave the light alone.
    Manual,
}

impl LightDecision {
    /// The logical output level to drive, if any.
    pub fn level(self) -> Option<bool> {
        match self {
            Self::On => Some(true),
            Self::Off => Some(false),
            Self::Manual => None,
        }
    }
}

/// Pure policy: below `threshold_percent` means dark enough for the light.
pub fn evaluate(light_percent: f32, threshold_percent: f32, manual: bool) -> LightDecision {
    if manual {
        LightDecision::Manual
    } else if light_percent < threshold_percent {
        LightDecision::On
    } else {
        LightDecision::Off
    }
}

/// Sticky manual-override flag.  Survives across outages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightOverride {
    manual: bool,
}

impl LightOverride {
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn latch(&mut self) {
        self.manual = true;
    }

    pub fn clear(&mut self) {
        self.manual = false;
    }
}

/// Policy, override flag and recheck cadence in one place.
pub struct LightController {
    threshold_percent: f32,
    manual: LightOverride,
    recheck: Periodic,
}

impl LightController {
    pub fn new(threshold_percent: f32, recheck_interval_ms: u64) -> Self {
        Self {
            threshold_percent,
            manual: LightOverride::default(),
            recheck: Periodic::new(recheck_interval_ms),
        }
    }

    /// Outage onset: decide immediately and start the recurring check.
    pub fn on_onset(&mut self, light_percent: f32, now_ms: u64) -> LightDecision {
        self.recheck.start(now_ms);
        self.decide(light_percent)
    }

    /// Recurring check.  `None` unless the check is due at `now_ms`.
    pub fn poll_recheck(&mut self, light_percent: f32, now_ms: u64) -> Option<LightDecision> {
        self.recheck
            .poll(now_ms)
            .then(|| self.decide(light_percent))
    }

    /// Outage end: stop checking and switch off unless overridden.
    pub fn on_end(&mut self) -> LightDecision {
        self.recheck.stop();
        if self.manual.is_manual() {
            LightDecision::Manual
        } else {
            LightDecision::Off
        }
    }

    pub fn decide(&self, light_percent: f32) -> LightDecision {
        evaluate(light_percent, self.threshold_percent, self.manual.is_manual())
    }

    pub fn set_manual(&mut self) {
        self.manual.latch();
    }

    pub fn set_auto(&mut self) {
        self.manual.clear();
    }

    pub fn is_manual(&self) -> bool {
        self.manual.is_manual()
    }

    pub fn recheck_running(&self) -> bool {
        self.recheck.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_turns_light_on() {
        assert_eq!(evaluate(20.0, 40.0, false), LightDecision::On);
        assert_eq!(evaluate(39.9, 40.0, false), LightDecision::On);
    }

    #[test]
    fn threshold_and_above_turn_light_off() {
        assert_eq!(evaluate(40.0, 40.0, false), LightDecision::Off);
        assert_eq!(evaluate(100.0, 40.0, false), LightDecision::Off);
    }

    #[test]
    fn manual_bypasses_policy() {
        assert_eq!(evaluate(0.0, 40.0, true), LightDecision::Manual);
        assert_eq!(LightDecision::Manual.level(), None);
    }

    #[test]
    fn recheck_runs_every_interval_from_onset() {
        let mut c = LightController::new(40.0, 20_000);
        assert_eq!(c.on_onset(20.0, 1_000), LightDecision::On);
        assert_eq!(c.poll_recheck(50.0, 20_999), None);
        assert_eq!(c.poll_recheck(50.0, 21_000), Some(LightDecision::Off));
        assert_eq!(c.poll_recheck(10.0, 41_000), Some(LightDecision::On));
    }

    #[test]
    fn end_stops_recheck_and_forces_off() {
        let mut c = LightController::new(40.0, 20_000);
        c.on_onset(20.0, 0);
        assert_eq!(c.on_end(), LightDecision::Off);
        assert!(!c.recheck_running());
        assert_eq!(c.poll_recheck(10.0, 100_000), None);
    }

    #[test]
    fn override_survives_outages_until_auto() {
        let mut c = LightController::new(40.0, 20_000);
        c.set_manual();
        assert_eq!(c.on_onset(5.0, 0), LightDecision::Manual);
        assert_eq!(c.poll_recheck(5.0, 20_000), Some(LightDecision::Manual));
        assert_eq!(c.on_end(), LightDecision::Manual);
        assert!(c.is_manual());
        c.set_auto();
        assert_eq!(c.decide(5.0), LightDecision::On);
    }
}
