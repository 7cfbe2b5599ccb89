//! INA3221 three-channel shunt/bus power monitor.
//!
//! Each channel has a shunt-voltage register (40 µV/LSB) and a
//! bus-voltage register (8 mV/LSB), both left-justified in bits 15..3.
//! Current is derived from the shunt voltage and the fitted shunt
//! resistor.  The driver is generic over any `embedded_hal` 1.0 I²C bus.
//!
//! ```text
//!   reg  0x01/0x03/0x05  shunt voltage  ch1/ch2/ch3
//!   reg  0x02/0x04/0x06  bus voltage    ch1/ch2/ch3
//!   reg  0xFE            manufacturer id  = 0x5449 ("TI")
//!   reg  0xFF            die id           = 0x3220
//! ```

use embedded_hal::i2c::I2c;

use crate::error::SensorError;
use crate::readings::RailReading;

const REG_MANUFACTURER_ID: u8 = 0xFE;
const REG_DIE_ID: u8 = 0xFF;
const MANUFACTURER_ID: u16 = 0x5449;
const DIE_ID: u16 = 0x3220;

const SHUNT_LSB_MV: f32 = 0.04;
const BUS_LSB_V: f32 = 0.008;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3,
}

impl Channel {
    fn shunt_register(self) -> u8 {
        match self {
            Self::Ch1 => 0x01,
            Self::Ch2 => 0x03,
            Self::Ch3 => 0x05,
        }
    }

    fn bus_register(self) -> u8 {
        self.shunt_register() + 1
    }
}

pub struct Ina3221<I2C> {
    i2c: I2C,
    address: u8,
    shunt_ohms: f32,
}

impl<I2C: I2c> Ina3221<I2C> {
    pub fn new(i2c: I2C, address: u8, shunt_ohms: f32) -> Self {
        Self {
            i2c,
            address,
            shunt_ohms,
        }
    }

    /// Check that an INA3221 answers at the configured address.
    pub fn probe(&mut self) -> Result<(), SensorError> {
        let manufacturer = self
            .read_register(REG_MANUFACTURER_ID)
            .map_err(|_| SensorError::DeviceNotFound)?;
        let die = self.read_register(REG_DIE_ID)?;
        if manufacturer != MANUFACTURER_ID || die != DIE_ID {
            return Err(SensorError::WrongDevice);
        }
        Ok(())
    }

    /// Bus voltage (V).
    pub fn bus_voltage_v(&mut self, ch: Channel) -> Result<f32, SensorError> {
        let raw = self.read_register(ch.bus_register())?;
        Ok(f32::from(justify(raw)) * BUS_LSB_V)
    }

    /// Shunt voltage (mV), signed.
    pub fn shunt_voltage_mv(&mut self, ch: Channel) -> Result<f32, SensorError> {
        let raw = self.read_register(ch.shunt_register())?;
        Ok(f32::from(justify(raw)) * SHUNT_LSB_MV)
    }

    /// Signed current through the shunt (mA).
    pub fn current_ma(&mut self, ch: Channel) -> Result<f32, SensorError> {
        Ok(self.shunt_voltage_mv(ch)? / self.shunt_ohms)
    }

    /// Voltage and current of one channel as a [`RailReading`].
    pub fn read_rail(&mut self, ch: Channel) -> Result<RailReading, SensorError> {
        let voltage = self.bus_voltage_v(ch)?;
        let current = self.current_ma(ch)?;
        Ok(RailReading::new(voltage, current))
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::BusReadFailed)?;
        Ok(u16::from_be_bytes(buf))
    }
}

/// Drop the three unused low bits, keeping the sign.
fn justify(raw: u16) -> i16 {
    (raw as i16) >> 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Register-file fake: a write selects the pointer, a read returns it.
    struct FakeBus {
        regs: [u16; 256],
        pointer: u8,
        fail: bool,
    }

    impl FakeBus {
        fn ina3221() -> Self {
            let mut regs = [0u16; 256];
            regs[0xFE] = MANUFACTURER_ID;
            regs[0xFF] = DIE_ID;
            Self {
                regs,
                pointer: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail || address != 0x40 {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.pointer = bytes[0],
                    Operation::Read(buf) => {
                        buf.copy_from_slice(&self.regs[self.pointer as usize].to_be_bytes());
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn probe_accepts_ina3221() {
        let mut dev = Ina3221::new(FakeBus::ina3221(), 0x40, 0.1);
        assert_eq!(dev.probe(), Ok(()));
    }

    #[test]
    fn probe_rejects_other_device() {
        let mut bus = FakeBus::ina3221();
        bus.regs[0xFF] = 0x2260;
        let mut dev = Ina3221::new(bus, 0x40, 0.1);
        assert_eq!(dev.probe(), Err(SensorError::WrongDevice));
    }

    #[test]
    fn probe_reports_missing_device() {
        let mut dev = Ina3221::new(FakeBus::ina3221(), 0x41, 0.1);
        assert_eq!(dev.probe(), Err(SensorError::DeviceNotFound));
    }

    #[test]
    fn bus_voltage_scaling() {
        let mut bus = FakeBus::ina3221();
        // 5.000 V = 625 LSB
        bus.regs[0x04] = 625 << 3;
        let mut dev = Ina3221::new(bus, 0x40, 0.1);
        assert!((dev.bus_voltage_v(Channel::Ch2).unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn current_from_shunt_keeps_sign_until_rail() {
        let mut bus = FakeBus::ina3221();
        // -10 mV across 0.1 Ω = -100 mA
        bus.regs[0x01] = ((-250i16) << 3) as u16;
        bus.regs[0x02] = 500 << 3;
        let mut dev = Ina3221::new(bus, 0x40, 0.1);
        assert!((dev.current_ma(Channel::Ch1).unwrap() + 100.0).abs() < 1e-3);

        let rail = dev.read_rail(Channel::Ch1).unwrap();
        assert!((rail.current_ma() - 100.0).abs() < 1e-3);
        assert!((rail.power_mw() - 400.0).abs() < 1e-2);
    }

    #[test]
    fn bus_error_maps_to_read_failed() {
        let mut bus = FakeBus::ina3221();
        bus.fail = true;
        let mut dev = Ina3221::new(bus, 0x40, 0.1);
        assert_eq!(dev.bus_voltage_v(Channel::Ch1), Err(SensorError::BusReadFailed));
    }
}
