//! Outbound application events.
//!
//! The [`PowerService`](super::service::PowerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish over MQTT,
//! forward to the chat bot.

use core::fmt::Write;

use crate::outage::OutageReport;
use crate::readings::ReadingSet;

/// Free-text progress line for the command-status stream.
pub type StatusText = heapless::String<128>;

/// Chat message body (alerts, replies, status reports).
pub type ChatText = heapless::String<384>;

/// Copy `s` into a bounded string, truncating at a char boundary.
pub fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Format into a bounded string; output past capacity is dropped.
pub fn bounded_fmt<const N: usize>(args: core::fmt::Arguments<'_>) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.write_fmt(args);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutageStatus {
    PowerCut,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayId {
    System,
    Aux,
}

/// Reported relay state.  `Pulse` marks a momentary invert-and-restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStatus {
    On,
    Off,
    Pulse,
}

impl From<bool> for RelayStatus {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightStatus {
    On,
    Off,
    Auto,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started.
    Started,

    OutageStatus(OutageStatus),

    /// Summary of a finished outage.
    OutageHistory(OutageReport),

    /// Tells dashboards to clear the command-status log.
    ClearLog,

    RelayStatus { relay: RelayId, status: RelayStatus },

    LightStatus(LightStatus),

    IndicatorStatus(bool),

    CommandStatus(StatusText),

    /// A periodic acquisition completed.
    Readings(ReadingSet),

    /// Link RSSI in dBm.
    SignalStrength(i8),

    /// Text for the chat-bot channel.
    Chat(ChatText),
}

impl AppEvent {
    pub fn status(text: &str) -> Self {
        Self::CommandStatus(bounded(text))
    }

    pub fn chat(text: &str) -> Self {
        Self::Chat(bounded(text))
    }
}
