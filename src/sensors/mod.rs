//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the power monitor and the light sensor and produces a
//! [`ReadingSet`] on demand.  A missing or failing sensor never stops the
//! loop: its quantities read as zero and the failure is logged once per
//! streak.

pub mod light_level;
pub mod power_monitor;

use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;
use log::{error, info, warn};

use crate::error::SensorError;
use crate::readings::{RailReading, ReadingSet};
use light_level::LightLevelSensor;
use power_monitor::{Channel, Ina3221};

/// Primary rail: main supply, energy is integrated here.
pub const PRIMARY_CHANNEL: Channel = Channel::Ch1;
/// Secondary rail: watched for outages.
pub const SECONDARY_CHANNEL: Channel = Channel::Ch2;

/// Latches the first failure of a streak so it is logged once.
#[derive(Debug, Default)]
struct FailureLatch {
    failing: bool,
}

impl FailureLatch {
    fn record<T>(&mut self, what: &str, result: Result<T, SensorError>) -> Option<T> {
        match result {
            Ok(v) => {
                if self.failing {
                    info!("{what}: reading again");
                    self.failing = false;
                }
                Some(v)
            }
            Err(e) => {
                if !self.failing {
                    warn!("{what}: {e}; reporting 0 until it recovers");
                    self.failing = true;
                }
                None
            }
        }
    }
}

pub struct SensorHub<I2C, B0, B1, B2> {
    monitor: Ina3221<I2C>,
    light: LightLevelSensor<B0, B1, B2>,
    monitor_present: bool,
    monitor_latch: FailureLatch,
    light_latch: FailureLatch,
}

impl<I2C, B0, B1, B2> SensorHub<I2C, B0, B1, B2>
where
    I2C: I2c,
    B0: InputPin,
    B1: InputPin,
    B2: InputPin,
{
    /// Build the hub and probe the power monitor.
    ///
    /// A failed probe is logged and the hub runs degraded.
    pub fn new(mut monitor: Ina3221<I2C>, light: LightLevelSensor<B0, B1, B2>) -> Self {
        let monitor_present = match monitor.probe() {
            Ok(()) => {
                info!("INA3221 power monitor found");
                true
            }
            Err(e) => {
                error!("INA3221 power monitor unavailable: {e}");
                false
            }
        };
        Self {
            monitor,
            light,
            monitor_present,
            monitor_latch: FailureLatch::default(),
            light_latch: FailureLatch::default(),
        }
    }

    /// Whether the power monitor answered its identity probe.
    pub fn monitor_present(&self) -> bool {
        self.monitor_present
    }

    /// Sample both rails and the light level.
    pub fn read_all(&mut self, now_ms: u64) -> ReadingSet {
        let primary = self.read_rail(PRIMARY_CHANNEL);
        let secondary = self.read_rail(SECONDARY_CHANNEL);
        let light_percent = self
            .light_latch
            .record("light sensor", self.light.read_percent())
            .unwrap_or(0.0);

        ReadingSet {
            primary,
            secondary,
            light_percent,
            sampled_at_ms: now_ms,
        }
    }

    fn read_rail(&mut self, ch: Channel) -> RailReading {
        let result = self.monitor.read_rail(ch);
        self.monitor_latch
            .record("power monitor", result)
            .unwrap_or_default()
    }
}
