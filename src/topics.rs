//! MQTT topic table.
//!
//! Every topic the firmware subscribes or publishes to lives here, so the
//! command decoder and the publisher agree on the same strings.

// ── Inbound (subscribed) ──────────────────────────────────────

pub const INDICATOR_CONTROL: &str = "esp32/led/control";
pub const SYSTEM_RELAY_CONTROL: &str = "esp32/led2/control";
pub const AUX_RELAY_CONTROL: &str = "esp32/led4/control";
pub const EMERGENCY_LIGHT_CONTROL: &str = "esp32/emergency/control";

/// All command topics, in subscription order.
pub const SUBSCRIPTIONS: [&str; 4] = [
    INDICATOR_CONTROL,
    SYSTEM_RELAY_CONTROL,
    AUX_RELAY_CONTROL,
    EMERGENCY_LIGHT_CONTROL,
];

// ── Outbound (published) ──────────────────────────────────────

pub const INDICATOR_STATUS: &str = "esp32/led/status";
pub const SYSTEM_RELAY_STATUS: &str = "esp32/led2/status";
pub const AUX_RELAY_STATUS: &str = "esp32/led4/status";
pub const EMERGENCY_LIGHT_STATUS: &str = "esp32/emergency/status";

pub const OUTAGE_STATUS: &str = "esp32/powercut/status";
pub const OUTAGE_HISTORY: &str = "esp32/history/powercut";
pub const COMMAND_STATUS: &str = "esp32/command/status";
pub const LIGHT_INTENSITY: &str = "esp32/light/intensity";

pub const PRIMARY_VOLTAGE: &str = "esp32/sensor/voltage";
pub const PRIMARY_CURRENT: &str = "esp32/sensor/current";
pub const PRIMARY_POWER: &str = "esp32/sensor/power";
pub const SECONDARY_VOLTAGE: &str = "esp32/sensor2/voltage";
pub const SECONDARY_CURRENT: &str = "esp32/sensor2/current";
pub const SECONDARY_POWER: &str = "esp32/sensor2/power";

/// Lives under the dashboard's `chami/` namespace, unlike the others.
pub const SIGNAL_STRENGTH: &str = "chami/esp32/stats/signal";
