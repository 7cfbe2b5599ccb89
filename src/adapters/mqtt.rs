//! ESP-IDF MQTT session.
//!
//! The client runs on its own task.  Its callback only forwards events
//! into [`INBOUND`](super::channels::INBOUND); the control loop does the
//! rest.  The client retries the broker on a fixed interval by itself,
//! so there is no supervisor on this link.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
use log::{debug, info, warn};

use super::channels::{MqttInbound, push_inbound};
use crate::app::ports::MessageTransport;
use crate::config::NetworkConfig;
use crate::error::CommsError;
use crate::topics;

pub struct MqttSession {
    client: EspMqttClient<'static>,
    connected: Arc<AtomicBool>,
}

impl MqttSession {
    /// Start the client.  Connection happens in the background; watch
    /// [`INBOUND`](super::channels::INBOUND) for `Connected`.
    pub fn start(network: &NetworkConfig, reconnect_backoff_ms: u64) -> Result<Self, CommsError> {
        let url = crate::app::events::bounded_fmt::<96>(format_args!(
            "mqtt://{}:{}",
            network.mqtt_broker, network.mqtt_port
        ));
        let conf = MqttClientConfiguration {
            client_id: Some(network.mqtt_client_id.as_str()),
            reconnect_timeout: Some(Duration::from_millis(reconnect_backoff_ms)),
            ..Default::default()
        };

        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);

        let client = EspMqttClient::new_cb(&url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                flag.store(true, Ordering::Release);
                push_inbound(MqttInbound::Connected);
            }
            EventPayload::Disconnected => {
                flag.store(false, Ordering::Release);
                push_inbound(MqttInbound::Disconnected);
            }
            EventPayload::Received {
                topic: Some(topic),
                data,
                ..
            } => match MqttInbound::message(topic, data) {
                Some(msg) => push_inbound(msg),
                None => debug!("MQTT: oversized message on {topic} ignored"),
            },
            EventPayload::Error(e) => warn!("MQTT: {e:?}"),
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT: client start failed: {e}");
            CommsError::MqttConnectFailed
        })?;

        info!("MQTT: client started for {url}");
        Ok(Self { client, connected })
    }

    /// Renew all command subscriptions.  Call on every `Connected`.
    pub fn subscribe_all(&mut self) {
        for topic in topics::SUBSCRIPTIONS {
            match self.client.subscribe(topic, QoS::AtMostOnce) {
                Ok(_) => info!("MQTT: subscribed {topic}"),
                Err(e) => warn!("MQTT: subscribe {topic} failed: {e}"),
            }
        }
    }
}

impl MessageTransport for MqttSession {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::MqttDisconnected);
        }
        self.client
            .enqueue(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .map(|_| ())
            .map_err(|_| CommsError::MqttPublishFailed)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
