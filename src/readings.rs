//! Reading buffer: the most recent sample of every monitored quantity.
//!
//! Refreshed on a fixed cadence by the acquisition path, or on demand by a
//! forced refresh.  Everything else in the firmware reads it by value.

use crate::timers::Periodic;

/// One rail of the power monitor: bus voltage, current and derived power.
///
/// Current is stored as a magnitude; the sign reported by the shunt
/// amplifier is discarded at construction, and power is always
/// `voltage_v * current_ma`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RailReading {
    voltage_v: f32,
    current_ma: f32,
    power_mw: f32,
}

impl RailReading {
    pub fn new(voltage_v: f32, current_ma: f32) -> Self {
        let current_ma = current_ma.abs();
        Self {
            voltage_v,
            current_ma,
            power_mw: voltage_v * current_ma,
        }
    }

    /// Bus voltage (V).
    pub fn voltage_v(&self) -> f32 {
        self.voltage_v
    }

    /// Current magnitude (mA).
    pub fn current_ma(&self) -> f32 {
        self.current_ma
    }

    /// Power (mW).
    pub fn power_mw(&self) -> f32 {
        self.power_mw
    }
}

/// A point-in-time snapshot of both rails and the ambient light level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSet {
    /// Main supply rail (energy is integrated on this one).
    pub primary: RailReading,
    /// System rail watched for outages.
    pub secondary: RailReading,
    /// Ambient light level, 0–100 %.
    pub light_percent: f32,
    /// Uptime at which the sample was taken (ms).
    pub sampled_at_ms: u64,
}

impl Default for ReadingSet {
    fn default() -> Self {
        Self {
            primary: RailReading::default(),
            secondary: RailReading::default(),
            // Bright until the first sample: keeps the light policy off.
            light_percent: 100.0,
            sampled_at_ms: 0,
        }
    }
}

/// Holds the latest [`ReadingSet`] and the acquisition cadence.
pub struct ReadingBuffer {
    latest: ReadingSet,
    cadence: Periodic,
    samples: u64,
}

impl ReadingBuffer {
    /// The first acquisition is due on the first poll after boot.
    pub fn new(acquisition_interval_ms: u64) -> Self {
        let mut cadence = Periodic::new(acquisition_interval_ms);
        cadence.start_immediately();
        Self {
            latest: ReadingSet::default(),
            cadence,
            samples: 0,
        }
    }

    /// Whether a periodic acquisition is due at `now_ms`.  Consumes the slot.
    pub fn acquisition_due(&mut self, now_ms: u64) -> bool {
        self.cadence.poll(now_ms)
    }

    /// Replace the buffered sample.
    pub fn store(&mut self, set: ReadingSet) {
        self.latest = set;
        self.samples = self.samples.wrapping_add(1);
    }

    pub fn latest(&self) -> ReadingSet {
        self.latest
    }

    /// Number of samples stored since boot (periodic and forced).
    pub fn sample_count(&self) -> u64 {
        self.samples
    }
}
