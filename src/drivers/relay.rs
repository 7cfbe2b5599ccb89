//! Polarity-aware digital output (relay coils, light driver, indicator).
//!
//! Callers always speak **logical** state: `true` = active.  The driver
//! maps it onto the pin level according to the wiring:
//!
//! | Polarity   | logical ON | logical OFF |
//! |------------|------------|-------------|
//! | ActiveLow  | LOW        | HIGH        |
//! | ActiveHigh | HIGH       | LOW         |
//!
//! The logical state is tracked even when a pin write fails, so the rest
//! of the firmware keeps a consistent picture of what was commanded.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    fn level(self, on: bool) -> PinState {
        match self {
            Self::ActiveHigh => PinState::from(on),
            Self::ActiveLow => PinState::from(!on),
        }
    }
}

pub struct Relay<P> {
    pin: P,
    polarity: Polarity,
    on: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Wrap a pin.  Call [`init`](Self::init) to drive the idle level.
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            on: false,
        }
    }

    /// Drive the inactive level.
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.set(false)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.on = on;
        self.write(on)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Invert for `hold_us`, then restore.  The logical state is unchanged
    /// afterwards.
    pub fn pulse(&mut self, hold_us: u32, delay: &mut impl DelayNs) -> Result<(), ActuatorError> {
        self.write(!self.on)?;
        delay.delay_us(hold_us);
        self.write(self.on)
    }

    fn write(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.pin
            .set_state(self.polarity.level(on))
            .map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Pin and delay fakes that record every level change.

    use core::convert::Infallible;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{ErrorType, OutputPin};
    use std::cell::RefCell;
    use std::rc::Rc;

    pub type Trace = Rc<RefCell<Vec<bool>>>;

    #[derive(Clone, Default)]
    pub struct MockPin {
        pub levels: Trace,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.borrow_mut().push(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.borrow_mut().push(true);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    pub struct MockDelay {
        pub waited_ns: Rc<RefCell<u64>>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            *self.waited_ns.borrow_mut() += u64::from(ns);
        }
    }
}
