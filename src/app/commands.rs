//! Inbound commands to the application service.
//!
//! Remote commands arrive as `(topic, payload)` pairs.  They are decoded
//! once, at the boundary, into a typed [`Command`]; the
//! [`PowerService`](super::service::PowerService) never sees strings.
//! Unknown topics and unrecognised payloads decode to `None` and are
//! dropped without an error.

use crate::topics;

/// Plain on/off request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Requests accepted on the two relay channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    On,
    Off,
    /// Invert-and-restore with a long hold.
    Pulse,
}

/// Requests accepted on the emergency-light channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    On,
    Off,
    /// Clear the manual override.
    Auto,
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Indicator(Switch),
    SystemRelay(RelayCommand),
    AuxRelay(RelayCommand),
    EmergencyLight(LightCommand),
}

impl Command {
    /// Decode a raw inbound message.
    pub fn decode(topic: &str, payload: &[u8]) -> Option<Self> {
        let payload = core::str::from_utf8(payload).ok()?;
        match topic {
            topics::INDICATOR_CONTROL => decode_switch(payload).map(Self::Indicator),
            topics::SYSTEM_RELAY_CONTROL => decode_relay(payload).map(Self::SystemRelay),
            topics::AUX_RELAY_CONTROL => decode_relay(payload).map(Self::AuxRelay),
            topics::EMERGENCY_LIGHT_CONTROL => decode_light(payload).map(Self::EmergencyLight),
            _ => None,
        }
    }
}

fn decode_switch(payload: &str) -> Option<Switch> {
    match payload {
        "ON" | "1" => Some(Switch::On),
        "OFF" | "0" => Some(Switch::Off),
        _ => None,
    }
}

fn decode_relay(payload: &str) -> Option<RelayCommand> {
    match payload {
        "PULSE" => Some(RelayCommand::Pulse),
        other => decode_switch(other).map(|s| match s {
            Switch::On => RelayCommand::On,
            Switch::Off => RelayCommand::Off,
        }),
    }
}

fn decode_light(payload: &str) -> Option<LightCommand> {
    match payload {
        "AUTO" => Some(LightCommand::Auto),
        other => decode_switch(other).map(|s| match s {
            Switch::On => LightCommand::On,
            Switch::Off => LightCommand::Off,
        }),
    }
}
