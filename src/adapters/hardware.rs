//! Hardware adapter. Bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the [`OutputBank`], exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  This is the only module in the
//! system that touches actual hardware.  Generic over the `embedded-hal`
//! traits, so host tests drive it with fakes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;

use crate::app::ports::{ActuatorPort, Output, SensorPort};
use crate::drivers::outputs::OutputBank;
use crate::readings::ReadingSet;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, B0, B1, B2, P, D> {
    sensors: SensorHub<I2C, B0, B1, B2>,
    outputs: OutputBank<P, D>,
}

impl<I2C, B0, B1, B2, P, D> HardwareAdapter<I2C, B0, B1, B2, P, D>
where
    I2C: I2c,
    B0: InputPin,
    B1: InputPin,
    B2: InputPin,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(sensors: SensorHub<I2C, B0, B1, B2>, outputs: OutputBank<P, D>) -> Self {
        Self { sensors, outputs }
    }

    pub fn sensors(&self) -> &SensorHub<I2C, B0, B1, B2> {
        &self.sensors
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C, B0, B1, B2, P, D> SensorPort for HardwareAdapter<I2C, B0, B1, B2, P, D>
where
    I2C: I2c,
    B0: InputPin,
    B1: InputPin,
    B2: InputPin,
{
    fn read_all(&mut self, now_ms: u64) -> ReadingSet {
        self.sensors.read_all(now_ms)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C, B0, B1, B2, P, D> ActuatorPort for HardwareAdapter<I2C, B0, B1, B2, P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn set_output(&mut self, output: Output, on: bool) {
        self.outputs.set(output, on);
    }

    fn is_on(&self, output: Output) -> bool {
        self.outputs.is_on(output)
    }

    fn pulse(&mut self, output: Output, hold_us: u32) {
        self.outputs.pulse(output, hold_us);
    }

    fn settle(&mut self, ms: u32) {
        self.outputs.settle(ms);
    }
}
