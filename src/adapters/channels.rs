//! Inter-task channel from the MQTT client task to the control loop.
//!
//! The MQTT client delivers events on its own task.  It pushes them into
//! a bounded `embassy-sync` channel; the control loop drains it once per
//! tick.  No heap, no locks held across the loop.
//!
//! ```text
//! ┌──────────────┐  MqttInbound  ┌──────────────┐
//! │  MQTT task   │──────────────▶│ Control loop │
//! │  (callback)  │               │  (sync)      │
//! └──────────────┘               └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::Command;

/// Longest topic accepted from the broker.
pub const TOPIC_CAPACITY: usize = 48;
/// Longest payload accepted (commands are single words).
pub const PAYLOAD_CAPACITY: usize = 16;

/// Something that happened on the messaging session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttInbound {
    /// Session (re)established: subscriptions must be renewed.
    Connected,
    Disconnected,
    Message {
        topic: heapless::String<TOPIC_CAPACITY>,
        payload: heapless::Vec<u8, PAYLOAD_CAPACITY>,
    },
}

impl MqttInbound {
    /// Copy a broker message into bounded storage.  `None` if it does not
    /// fit, which no valid command does.
    pub fn message(topic: &str, payload: &[u8]) -> Option<Self> {
        Some(Self::Message {
            topic: heapless::String::try_from(topic).ok()?,
            payload: heapless::Vec::from_slice(payload).ok()?,
        })
    }

    /// Decode into a typed command, if this is a recognised one.
    pub fn command(&self) -> Option<Command> {
        match self {
            Self::Message { topic, payload } => Command::decode(topic, payload),
            _ => None,
        }
    }
}

/// Channel depth.  Commands beyond this between two loop ticks are dropped.
const INBOUND_DEPTH: usize = 8;

/// MQTT task → control loop.
pub static INBOUND: Channel<CriticalSectionRawMutex, MqttInbound, INBOUND_DEPTH> = Channel::new();

/// Queue an event from the MQTT task.  Never blocks.
pub fn push_inbound(event: MqttInbound) {
    if INBOUND.try_send(event).is_err() {
        warn!("Inbound MQTT queue full, event dropped");
    }
}

/// Take the next queued event, if any.
pub fn pop_inbound() -> Option<MqttInbound> {
    INBOUND.try_receive().ok()
}
