//! Chat-bot commands and message texts.
//!
//! Only two commands exist: `/status` (forced refresh + report) and
//! `/start` (greeting).  Updates from any chat other than the authorised
//! one are dropped before they reach the service.

use crate::outage::{OutageOnset, OutageReport};
use crate::readings::ReadingSet;

use super::events::{ChatText, bounded_fmt};

/// One inbound chat message, as delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUpdate {
    pub update_id: i64,
    pub chat_id: heapless::String<24>,
    pub text: heapless::String<64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    Status,
    Start,
}

impl ChatCommand {
    /// Authorise and parse an update.  `None` for foreign chats and
    /// unknown text.
    pub fn from_update(update: &ChatUpdate, authorized_chat_id: &str) -> Option<Self> {
        if update.chat_id.as_str() != authorized_chat_id {
            return None;
        }
        match update.text.trim() {
            "/status" => Some(Self::Status),
            "/start" => Some(Self::Start),
            _ => None,
        }
    }
}

pub const GREETING: &str = "Welcome! Send /status to check sensors.";
pub const WAKING_UP: &str = "Waking up system to check status...";

/// Report sent in reply to `/status`.
pub fn status_report(set: &ReadingSet, returned_to_sleep: bool) -> ChatText {
    let mut report: ChatText = bounded_fmt(format_args!(
        "*SYSTEM STATUS*\n\n\
         *Main Power*\n   Voltage: {:.2} V\n   Current: {:.1} mA\n\n\
         *Battery*\n   Voltage: {:.2} V\n   Current: {:.1} mA\n\n\
         *Light Intensity*\n   Light: {:.0}%\n",
        set.primary.voltage_v(),
        set.primary.current_ma(),
        set.secondary.voltage_v(),
        set.secondary.current_ma(),
        set.light_percent,
    ));
    if returned_to_sleep {
        let _ = report.push_str("\n_(System returned to sleep mode)_");
    }
    report
}

pub fn outage_alert(onset: &OutageOnset) -> ChatText {
    bounded_fmt(format_args!(
        "Power Cut Detected!\nMain Voltage: {:.2}V\nSystem Voltage: {:.2}V",
        onset.primary_voltage_v, onset.secondary_voltage_v
    ))
}

pub fn restore_alert(report: &OutageReport) -> ChatText {
    bounded_fmt(format_args!(
        "Power Restored.\nDuration: {} seconds\nEnergy Used: {:.2} mWh",
        report.duration_ms / 1_000,
        report.energy_mwh
    ))
}
