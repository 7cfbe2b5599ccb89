//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                 | Connects to                  |
//! |-------------|----------------------------|------------------------------|
//! | `hardware`  | SensorPort, ActuatorPort   | INA3221 (I²C), GPIO          |
//! | `log_sink`  | EventSink                  | Serial log output            |
//! | `publisher` | EventSink                  | Any MessageTransport         |
//! | `mqtt`      | MessageTransport           | ESP-IDF MQTT client          |
//! | `channels`  | -                          | MQTT task → control loop     |
//! | `telegram`  | ChatPort, EventSink        | Telegram Bot API (HTTPS)     |
//! | `wifi`      | Reconnectable              | ESP-IDF WiFi STA             |
//! | `link`      | -                          | Reconnect supervision        |
//! | `time`      | -                          | ESP32 system timer           |

pub mod channels;
pub mod hardware;
pub mod link;
pub mod log_sink;
#[cfg(feature = "espidf")]
pub mod mqtt;
pub mod publisher;
pub mod telegram;
pub mod time;
pub mod wifi;
