//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PowerService (domain)
//! ```
//!
//! Driven adapters (sensors, outputs, event sinks, transports) implement
//! these traits.  The [`PowerService`](super::service::PowerService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::CommsError;
use crate::readings::ReadingSet;

use super::chat::ChatUpdate;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain a fresh sample.
pub trait SensorPort {
    /// Read both power rails and the light level.
    ///
    /// Never fails: a missing or faulty sensor yields sentinel zeros.
    fn read_all(&mut self, now_ms: u64) -> ReadingSet;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The four digital outputs on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    SystemRelay,
    AuxRelay,
    EmergencyLight,
    StatusIndicator,
}

impl Output {
    pub const ALL: [Output; 4] = [
        Self::SystemRelay,
        Self::AuxRelay,
        Self::EmergencyLight,
        Self::StatusIndicator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SystemRelay => "system relay",
            Self::AuxRelay => "aux relay",
            Self::EmergencyLight => "emergency light",
            Self::StatusIndicator => "status indicator",
        }
    }
}

/// Write-side port.  All states are **logical** (`true` = active); the
/// adapter owns the electrical polarity of each output.
pub trait ActuatorPort {
    /// Drive an output to a logical state.
    fn set_output(&mut self, output: Output, on: bool);

    /// Last logical state driven on an output.
    fn is_on(&self, output: Output) -> bool;

    /// Drive the opposite state for `hold_us`, then restore.  Blocks for
    /// the duration of the hold.
    fn pulse(&mut self, output: Output, hold_us: u32);

    /// Block for `ms` (relay settle times).
    fn settle(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → log / MQTT / chat)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan-out to two sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Transport ports (driven adapters: domain ↔ network)
// ───────────────────────────────────────────────────────────────

/// Publish side of the messaging session.
///
/// Publishing while disconnected fails; nothing is queued.
pub trait MessageTransport {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;
}

/// Chat-bot channel.
pub trait ChatPort {
    /// Fetch the next pending update, if any.
    fn poll_update(&mut self) -> Result<Option<ChatUpdate>, CommsError>;

    /// Send a text message to the configured chat.
    fn send(&mut self, text: &str) -> Result<(), CommsError>;
}
