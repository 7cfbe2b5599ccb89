//! PowerGuard firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   MqttPublisher   ChatSink    │
//! │  (Sensor+Actuator)  (EventSink)    (EventSink)     (EventSink) │
//! │  WifiAdapter + LinkSupervisor      MqttSession ──▶ INBOUND     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            PowerService (pure logic)                   │    │
//! │  │  OutageDetector · Sequencer FSM · Light policy         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single cooperative loop: tick the service, drain inbound MQTT
//! commands, supervise WiFi, publish RSSI, poll the chat bot, sleep.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{debug, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Delay, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use powerguard::adapters::channels::{MqttInbound, pop_inbound};
use powerguard::adapters::hardware::HardwareAdapter;
use powerguard::adapters::link::{LinkEvent, LinkSupervisor, Reconnectable};
use powerguard::adapters::log_sink::LogEventSink;
use powerguard::adapters::mqtt::MqttSession;
use powerguard::adapters::publisher::MqttPublisher;
use powerguard::adapters::telegram::{ChatSink, TelegramClient, drain_updates};
use powerguard::adapters::time::MonotonicClock;
use powerguard::adapters::wifi::{Credentials, WifiAdapter};
use powerguard::app::chat::ChatCommand;
use powerguard::app::ports::MessageTransport;
use powerguard::app::service::PowerService;
use powerguard::config::{NetworkConfig, SystemConfig};
use powerguard::drivers::outputs::OutputBank;
use powerguard::pins;
use powerguard::sensors::SensorHub;
use powerguard::sensors::light_level::LightLevelSensor;
use powerguard::sensors::power_monitor::Ina3221;

/// Compile-time value or a fallback, clipped to the field capacity.
fn env_or<const N: usize>(value: Option<&'static str>, fallback: &str) -> heapless::String<N> {
    powerguard::app::events::bounded(value.unwrap_or(fallback))
}

fn network_from_env() -> NetworkConfig {
    let defaults = NetworkConfig::default();
    NetworkConfig {
        wifi_ssid: env_or(option_env!("POWERGUARD_WIFI_SSID"), &defaults.wifi_ssid),
        wifi_password: env_or(option_env!("POWERGUARD_WIFI_PASS"), &defaults.wifi_password),
        mqtt_broker: env_or(option_env!("POWERGUARD_MQTT_BROKER"), &defaults.mqtt_broker),
        mqtt_port: option_env!("POWERGUARD_MQTT_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.mqtt_port),
        mqtt_client_id: env_or(option_env!("POWERGUARD_MQTT_CLIENT_ID"), &defaults.mqtt_client_id),
        bot_token: env_or(option_env!("POWERGUARD_BOT_TOKEN"), &defaults.bot_token),
        chat_id: env_or(option_env!("POWERGUARD_CHAT_ID"), &defaults.chat_id),
    }
}

/// Every GPIO the board uses, built from the numbers in [`pins`].
struct BoardPins {
    sda: AnyIOPin,
    scl: AnyIOPin,
    light_b0: AnyInputPin,
    light_b1: AnyInputPin,
    light_b2: AnyInputPin,
    system_relay: AnyOutputPin,
    aux_relay: AnyOutputPin,
    emergency_light: AnyOutputPin,
    indicator: AnyOutputPin,
}

impl BoardPins {
    /// Claim the board's GPIOs.  Call once; the matching typed fields of
    /// `Peripherals::pins` must stay unused.
    fn claim() -> Self {
        // SAFETY: each number in `pins` is distinct (checked by its tests)
        // and nothing else in the firmware touches these GPIOs.
        unsafe {
            Self {
                sda: AnyIOPin::new(pins::I2C_SDA_GPIO),
                scl: AnyIOPin::new(pins::I2C_SCL_GPIO),
                light_b0: AnyInputPin::new(pins::LIGHT_B0_GPIO),
                light_b1: AnyInputPin::new(pins::LIGHT_B1_GPIO),
                light_b2: AnyInputPin::new(pins::LIGHT_B2_GPIO),
                system_relay: AnyOutputPin::new(pins::SYSTEM_RELAY_GPIO),
                aux_relay: AnyOutputPin::new(pins::AUX_RELAY_GPIO),
                emergency_light: AnyOutputPin::new(pins::EMERGENCY_LIGHT_GPIO),
                indicator: AnyOutputPin::new(pins::STATUS_INDICATOR_GPIO),
            }
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PowerGuard v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig {
        network: network_from_env(),
        ..SystemConfig::default()
    };
    config.validate().map_err(anyhow::Error::msg)?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let board = BoardPins::claim();

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        board.sda,
        board.scl,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )
    .context("I2C init")?;
    let monitor = Ina3221::new(i2c, pins::INA3221_ADDR, config.shunt_ohms);
    let light = LightLevelSensor::new(
        PinDriver::input(board.light_b0)?,
        PinDriver::input(board.light_b1)?,
        PinDriver::input(board.light_b2)?,
    );
    let hub = SensorHub::new(monitor, light);

    let mut outputs = OutputBank::new(
        PinDriver::output(board.system_relay)?,
        PinDriver::output(board.aux_relay)?,
        PinDriver::output(board.emergency_light)?,
        PinDriver::output(board.indicator)?,
        Delay::new_default(),
    );
    outputs.init().map_err(anyhow::Error::msg)?;
    let mut hw = HardwareAdapter::new(hub, outputs);

    // ── 4. Network ────────────────────────────────────────────
    let credentials = Credentials::new(&config.network.wifi_ssid, &config.network.wifi_password)
        .map_err(|e| anyhow::anyhow!("WiFi credentials: {e}"))?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver, credentials);
    let mut wifi_link = LinkSupervisor::new(config.reconnect_backoff_ms);

    let mqtt = MqttSession::start(&config.network, config.reconnect_backoff_ms)
        .map_err(anyhow::Error::msg)?;
    let chat = TelegramClient::new(&config.network.bot_token, &config.network.chat_id);

    let mut sink = (
        LogEventSink::new(),
        (MqttPublisher::new(mqtt), ChatSink::new(chat)),
    );

    // ── 5. Service ────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut service = PowerService::new(config.clone());
    service.start(clock.now_ms(), &mut sink);

    let authorized_chat = config.network.chat_id.clone();
    let mut chat_commands: Vec<ChatCommand> = Vec::new();

    loop {
        let now = clock.now_ms();

        service.tick(now, &mut hw, &mut sink);

        while let Some(inbound) = pop_inbound() {
            match inbound {
                MqttInbound::Connected => {
                    info!("MQTT: session up");
                    sink.1.0.transport_mut().subscribe_all();
                    service.on_transport_connected(&hw, &mut sink);
                }
                MqttInbound::Disconnected => warn!("MQTT: session down"),
                msg @ MqttInbound::Message { .. } => match msg.command() {
                    Some(cmd) => service.handle_command(cmd, &mut hw, &mut sink),
                    None => debug!("MQTT: ignored {:?}", msg),
                },
            }
        }

        if wifi_link.poll(now, &mut wifi) == LinkEvent::Lost {
            warn!("WiFi lost, MQTT connected={}", sink.1.0.transport().is_connected());
        }
        service.poll_signal(now, wifi.rssi(), &mut sink);

        if service.chat_poll_due(now) && wifi.is_up() {
            drain_updates(sink.1.1.port_mut(), |update| {
                if let Some(cmd) = ChatCommand::from_update(&update, &authorized_chat) {
                    chat_commands.push(cmd);
                }
            });
            for cmd in chat_commands.drain(..) {
                service.handle_chat(cmd, clock.now_ms(), &mut hw, &mut sink);
            }
        }

        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}
