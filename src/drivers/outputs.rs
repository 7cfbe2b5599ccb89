//! The board's four digital outputs plus the delay used to time pulses.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use super::relay::{Polarity, Relay};
use crate::app::ports::Output;
use crate::error::ActuatorError;

/// Polarity of each output as wired on the main board.
pub fn polarity_of(output: Output) -> Polarity {
    match output {
        Output::StatusIndicator => Polarity::ActiveHigh,
        Output::SystemRelay | Output::AuxRelay | Output::EmergencyLight => Polarity::ActiveLow,
    }
}

pub struct OutputBank<P, D> {
    system_relay: Relay<P>,
    aux_relay: Relay<P>,
    emergency_light: Relay<P>,
    indicator: Relay<P>,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> OutputBank<P, D> {
    pub fn new(system_relay: P, aux_relay: P, emergency_light: P, indicator: P, delay: D) -> Self {
        Self {
            system_relay: Relay::new(system_relay, polarity_of(Output::SystemRelay)),
            aux_relay: Relay::new(aux_relay, polarity_of(Output::AuxRelay)),
            emergency_light: Relay::new(emergency_light, polarity_of(Output::EmergencyLight)),
            indicator: Relay::new(indicator, polarity_of(Output::StatusIndicator)),
            delay,
        }
    }

    /// Drive every output to its inactive level.
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        for output in Output::ALL {
            self.relay_mut(output).init()?;
        }
        Ok(())
    }

    pub fn set(&mut self, output: Output, on: bool) {
        debug!("{} -> {}", output.name(), if on { "ON" } else { "OFF" });
        if let Err(e) = self.relay_mut(output).set(on) {
            warn!("{}: {e}", output.name());
        }
    }

    pub fn is_on(&self, output: Output) -> bool {
        self.relay(output).is_on()
    }

    pub fn pulse(&mut self, output: Output, hold_us: u32) {
        let relay = match output {
            Output::SystemRelay => &mut self.system_relay,
            Output::AuxRelay => &mut self.aux_relay,
            Output::EmergencyLight => &mut self.emergency_light,
            Output::StatusIndicator => &mut self.indicator,
        };
        if let Err(e) = relay.pulse(hold_us, &mut self.delay) {
            warn!("{} pulse: {e}", output.name());
        }
    }

    pub fn settle(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn relay(&self, output: Output) -> &Relay<P> {
        match output {
            Output::SystemRelay => &self.system_relay,
            Output::AuxRelay => &self.aux_relay,
            Output::EmergencyLight => &self.emergency_light,
            Output::StatusIndicator => &self.indicator,
        }
    }

    fn relay_mut(&mut self, output: Output) -> &mut Relay<P> {
        match output {
            Output::SystemRelay => &mut self.system_relay,
            Output::AuxRelay => &mut self.aux_relay,
            Output::EmergencyLight => &mut self.emergency_light,
            Output::StatusIndicator => &mut self.indicator,
        }
    }
}
