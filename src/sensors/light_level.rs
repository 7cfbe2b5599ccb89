//! Ambient light sensor with a 3-bit parallel output.
//!
//! The module drives three digital lines (B0 = LSB) encoding a level code
//! 0–7.  The code maps linearly onto a percentage: `code / 7 * 100`.

use embedded_hal::digital::InputPin;

use crate::error::SensorError;

/// Highest level code the sensor can report.
pub const MAX_CODE: u8 = 7;

/// Convert a 3-bit level code to a percentage.
pub fn code_to_percent(code: u8) -> f32 {
    f32::from(code.min(MAX_CODE)) / f32::from(MAX_CODE) * 100.0
}

pub struct LightLevelSensor<B0, B1, B2> {
    b0: B0,
    b1: B1,
    b2: B2,
}

impl<B0: InputPin, B1: InputPin, B2: InputPin> LightLevelSensor<B0, B1, B2> {
    pub fn new(b0: B0, b1: B1, b2: B2) -> Self {
        Self { b0, b1, b2 }
    }

    /// Raw level code, 0–7.
    pub fn read_code(&mut self) -> Result<u8, SensorError> {
        let b0 = sample(&mut self.b0)?;
        let b1 = sample(&mut self.b1)?;
        let b2 = sample(&mut self.b2)?;
        Ok(b0 | (b1 << 1) | (b2 << 2))
    }

    /// Light level, 0–100 %.
    pub fn read_percent(&mut self) -> Result<f32, SensorError> {
        self.read_code().map(code_to_percent)
    }
}

fn sample(pin: &mut impl InputPin) -> Result<u8, SensorError> {
    pin.is_high()
        .map(u8::from)
        .map_err(|_| SensorError::GpioReadFailed)
}
