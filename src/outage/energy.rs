//! Energy drawn on the primary rail during an outage.
//!
//! Each sample contributes `power × elapsed` since the previous sample,
//! so a constant power `P` held for `T` ms integrates to exactly
//! `P · T / 3 600 000` mWh regardless of how the samples are spaced.

const MS_PER_HOUR: f32 = 3_600_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyIntegrator {
    total_mwh: f32,
    last_calc_ms: u64,
}

impl EnergyIntegrator {
    pub const fn new() -> Self {
        Self {
            total_mwh: 0.0,
            last_calc_ms: 0,
        }
    }

    /// Zero the total and start counting from `now_ms` (outage onset).
    pub fn restart(&mut self, now_ms: u64) {
        self.total_mwh = 0.0;
        self.last_calc_ms = now_ms;
    }

    /// Add the energy drawn since the previous call at `power_mw`.
    pub fn accumulate(&mut self, power_mw: f32, now_ms: u64) {
        let elapsed_ms = now_ms.saturating_sub(self.last_calc_ms);
        let delta_hours = elapsed_ms as f32 / MS_PER_HOUR;
        self.total_mwh += power_mw * delta_hours;
        self.last_calc_ms = now_ms;
    }

    /// Energy accumulated since the last restart (mWh).
    pub fn total_mwh(&self) -> f32 {
        self.total_mwh
    }
}
