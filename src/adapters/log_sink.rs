//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  Runs alongside the
//! MQTT and chat sinks so the serial console mirrors everything.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | monitoring");
            }
            AppEvent::OutageStatus(s) => {
                warn!("OUTAGE | {:?}", s);
            }
            AppEvent::OutageHistory(r) => {
                info!(
                    "OUTAGE | ended after {} ms | {:.2}V -> {:.2}V (drop {:.2}V) | {:.2} mWh",
                    r.duration_ms, r.start_voltage_v, r.end_voltage_v, r.drop_v, r.energy_mwh
                );
            }
            AppEvent::ClearLog => {
                info!("CMD   | --- log cleared ---");
            }
            AppEvent::RelayStatus { relay, status } => {
                info!("RELAY | {:?} = {:?}", relay, status);
            }
            AppEvent::LightStatus(s) => {
                info!("LIGHT | {:?}", s);
            }
            AppEvent::IndicatorStatus(on) => {
                info!("LED   | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::CommandStatus(msg) => {
                info!("CMD   | {}", msg);
            }
            AppEvent::Readings(set) => {
                info!(
                    "READ  | main={:.3}V {:.2}mA {:.2}mW | sys={:.3}V {:.2}mA {:.2}mW | light={:.1}%",
                    set.primary.voltage_v(),
                    set.primary.current_ma(),
                    set.primary.power_mw(),
                    set.secondary.voltage_v(),
                    set.secondary.current_ma(),
                    set.secondary.power_mw(),
                    set.light_percent,
                );
            }
            AppEvent::SignalStrength(rssi) => {
                info!("RSSI  | {} dBm", rssi);
            }
            AppEvent::Chat(text) => {
                info!("CHAT  | {}", text);
            }
        }
    }
}
