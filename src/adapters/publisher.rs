//! MQTT publisher. Maps [`AppEvent`]s onto topics and payloads.
//!
//! Rendering is pure (`render`) so the topic/payload contract is tested on
//! the host.  [`MqttPublisher`] wraps any [`MessageTransport`] as an
//! [`EventSink`]; publish failures are logged and dropped, never queued.

use core::fmt::Write;

use log::debug;

use crate::app::events::{AppEvent, LightStatus, OutageStatus, RelayId, RelayStatus};
use crate::app::ports::{EventSink, MessageTransport};
use crate::outage::OutageReport;
use crate::readings::RailReading;
use crate::topics;

/// Longest payload rendered (the outage history JSON).
pub const PAYLOAD_CAPACITY: usize = 160;

pub type Payload = heapless::String<PAYLOAD_CAPACITY>;

/// One rendered publish.
pub type Publish = (&'static str, Payload);

/// Upper bound of publishes per event (a full reading set).
const MAX_PUBLISHES: usize = 8;

/// Outage history as a compact JSON object.  Duration in ms, the rest
/// fixed to two decimals.
pub fn history_json(r: &OutageReport) -> Payload {
    number(format_args!(
        "{{\"duration\":{},\"startV\":{:.2},\"endV\":{:.2},\"drop\":{:.2},\"energy\":{:.2}}}",
        r.duration_ms, r.start_voltage_v, r.end_voltage_v, r.drop_v, r.energy_mwh
    ))
}

fn text(s: &str) -> Payload {
    crate::app::events::bounded(s)
}

fn on_off(on: bool) -> Payload {
    text(if on { "ON" } else { "OFF" })
}

fn number(args: core::fmt::Arguments<'_>) -> Payload {
    let mut p = Payload::new();
    let _ = p.write_fmt(args);
    p
}

fn push_rail(
    out: &mut heapless::Vec<Publish, MAX_PUBLISHES>,
    rail: &RailReading,
    [voltage, current, power]: [&'static str; 3],
) {
    let _ = out.push((voltage, number(format_args!("{:.3}", rail.voltage_v()))));
    let _ = out.push((current, number(format_args!("{:.2}", rail.current_ma()))));
    let _ = out.push((power, number(format_args!("{:.2}", rail.power_mw()))));
}

/// Topics and payloads to publish for `event`.  Empty for events that
/// have no MQTT representation.
pub fn render(event: &AppEvent) -> heapless::Vec<Publish, MAX_PUBLISHES> {
    let mut out = heapless::Vec::new();
    match event {
        AppEvent::Started | AppEvent::Chat(_) => {}

        AppEvent::OutageStatus(s) => {
            let p = match s {
                OutageStatus::PowerCut => "POWER_CUT",
                OutageStatus::Normal => "NORMAL",
            };
            let _ = out.push((topics::OUTAGE_STATUS, text(p)));
        }

        AppEvent::OutageHistory(report) => {
            let _ = out.push((topics::OUTAGE_HISTORY, history_json(report)));
        }

        AppEvent::ClearLog => {
            let _ = out.push((topics::COMMAND_STATUS, text("CLEAR_LOG")));
        }

        AppEvent::RelayStatus { relay, status } => {
            let topic = match relay {
                RelayId::System => topics::SYSTEM_RELAY_STATUS,
                RelayId::Aux => topics::AUX_RELAY_STATUS,
            };
            let p = match status {
                RelayStatus::On => "ON",
                RelayStatus::Off => "OFF",
                RelayStatus::Pulse => "PULSE",
            };
            let _ = out.push((topic, text(p)));
        }

        AppEvent::LightStatus(s) => {
            let p = match s {
                LightStatus::On => "ON",
                LightStatus::Off => "OFF",
                LightStatus::Auto => "AUTO",
            };
            let _ = out.push((topics::EMERGENCY_LIGHT_STATUS, text(p)));
        }

        AppEvent::IndicatorStatus(on) => {
            let _ = out.push((topics::INDICATOR_STATUS, on_off(*on)));
        }

        AppEvent::CommandStatus(msg) => {
            let _ = out.push((topics::COMMAND_STATUS, text(msg)));
        }

        AppEvent::Readings(set) => {
            let _ = out.push((
                topics::LIGHT_INTENSITY,
                number(format_args!("{:.1}", set.light_percent)),
            ));
            push_rail(
                &mut out,
                &set.primary,
                [
                    topics::PRIMARY_VOLTAGE,
                    topics::PRIMARY_CURRENT,
                    topics::PRIMARY_POWER,
                ],
            );
            push_rail(
                &mut out,
                &set.secondary,
                [
                    topics::SECONDARY_VOLTAGE,
                    topics::SECONDARY_CURRENT,
                    topics::SECONDARY_POWER,
                ],
            );
        }

        AppEvent::SignalStrength(rssi) => {
            let _ = out.push((topics::SIGNAL_STRENGTH, number(format_args!("{rssi}"))));
        }
    }
    out
}

/// [`EventSink`] that publishes over a [`MessageTransport`].
pub struct MqttPublisher<T> {
    transport: T,
    dropped: u32,
}

impl<T: MessageTransport> MqttPublisher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            dropped: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Publishes dropped because the session was down or the send failed.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<T: MessageTransport> EventSink for MqttPublisher<T> {
    fn emit(&mut self, event: &AppEvent) {
        for (topic, payload) in render(event) {
            if !self.transport.is_connected() {
                self.dropped = self.dropped.saturating_add(1);
                continue;
            }
            if let Err(e) = self.transport.publish(topic, &payload) {
                debug!("publish {topic}: {e}");
                self.dropped = self.dropped.saturating_add(1);
            }
        }
    }
}
