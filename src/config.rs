//! System configuration parameters
//!
//! All tunable parameters for the PowerGuard system.  Values are fixed at
//! boot (built from defaults plus compile-time network identity); there is
//! no runtime reload.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Network identity and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// WiFi station SSID.
    pub wifi_ssid: String<32>,
    /// WiFi WPA2 passphrase (empty for open networks).
    pub wifi_password: String<64>,
    /// MQTT broker host name.
    pub mqtt_broker: String<64>,
    /// MQTT broker TCP port.
    pub mqtt_port: u16,
    /// MQTT client identifier.
    pub mqtt_client_id: String<32>,
    /// Chat-bot API token.
    pub bot_token: String<64>,
    /// The only chat allowed to issue bot commands and receive alerts.
    pub chat_id: String<24>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            mqtt_broker: String::try_from("broker.hivemq.com").unwrap_or_default(),
            mqtt_port: 1883,
            mqtt_client_id: String::try_from("powerguard-esp32").unwrap_or_default(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Detection ---
    /// Secondary rail voltage below which an outage is declared (V).
    pub outage_threshold_v: f32,
    /// Light level below which the emergency light is switched on (%).
    pub light_on_below_percent: f32,

    // --- Emergency sequence ---
    /// Delay from onset to the auxiliary relay pulse (ms).
    pub aux_pulse_delay_ms: u64,
    /// Length of the emergency window counted from onset (ms).
    pub emergency_window_ms: u64,
    /// Period of the light policy re-evaluation during an outage (ms).
    pub light_recheck_interval_ms: u64,

    // --- Pulses ---
    /// Width of a short trigger pulse (µs).
    pub short_pulse_us: u32,
    /// Width of a commanded hold pulse (ms).
    pub hold_pulse_ms: u32,
    /// Settle time after a primary relay OFF command before the heartbeat (ms).
    pub relay_settle_ms: u32,
    /// Gap between the two heartbeat pulses (ms).
    pub heartbeat_gap_ms: u32,
    /// Settle time after temporarily waking the system for a status report (ms).
    pub status_wake_settle_ms: u32,

    // --- Timing ---
    /// Sensor acquisition period (ms).
    pub acquisition_interval_ms: u64,
    /// Control loop polling period (ms).
    pub loop_interval_ms: u32,
    /// Signal strength publication period (ms).
    pub signal_interval_ms: u64,
    /// Chat-bot polling period (ms).
    pub chat_poll_interval_ms: u64,
    /// Fixed reconnect backoff for the network link and messaging session (ms).
    pub reconnect_backoff_ms: u64,

    // --- Sensing ---
    /// Shunt resistance on every power monitor channel (Ω).
    pub shunt_ohms: f32,

    // --- Network ---
    pub network: NetworkConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Detection
            outage_threshold_v: 1.0,
            light_on_below_percent: 40.0,

            // Emergency sequence
            aux_pulse_delay_ms: 200,
            emergency_window_ms: 60_000,
            light_recheck_interval_ms: 20_000,

            // Pulses
            short_pulse_us: 10,
            hold_pulse_ms: 2_000,
            relay_settle_ms: 1_000,
            heartbeat_gap_ms: 100,
            status_wake_settle_ms: 500,

            // Timing
            acquisition_interval_ms: 2_000,
            loop_interval_ms: 10,
            signal_interval_ms: 5_000,
            chat_poll_interval_ms: 1_000,
            reconnect_backoff_ms: 5_000,

            // Sensing
            shunt_ohms: 0.1,

            network: NetworkConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the sequencer or policy meaningless.
    pub fn validate(&self) -> Result<(), Error> {
        if self.outage_threshold_v <= 0.0 {
            return Err(Error::Config("outage_threshold_v must be positive"));
        }
        if !(0.0..=100.0).contains(&self.light_on_below_percent) {
            return Err(Error::Config("light_on_below_percent must be within 0-100"));
        }
        if self.aux_pulse_delay_ms >= self.emergency_window_ms {
            return Err(Error::Config("aux pulse must fire inside the emergency window"));
        }
        if self.acquisition_interval_ms == 0
            || self.light_recheck_interval_ms == 0
            || self.loop_interval_ms == 0
        {
            return Err(Error::Config("periods must be non-zero"));
        }
        if self.shunt_ohms <= 0.0 {
            return Err(Error::Config("shunt_ohms must be positive"));
        }
        Ok(())
    }
}
