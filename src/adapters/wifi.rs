//! WiFi station-mode adapter.
//!
//! Implements [`Reconnectable`] so the [`LinkSupervisor`] can keep the
//! station associated, and reports link RSSI for the signal-strength
//! publication.
//!
//! ## cfg gating
//!
//! - **`feature = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - otherwise: a simulated radio for host-side tests.
//!
//! [`LinkSupervisor`]: super::link::LinkSupervisor

use core::fmt;
use log::{info, warn};

use super::link::Reconnectable;
use crate::error::CommsError;

#[cfg(feature = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

/// Validated station credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl Credentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self {
            ssid: heapless::String::try_from(ssid).map_err(|_| CredentialError::InvalidSsid)?,
            password: heapless::String::try_from(password)
                .map_err(|_| CredentialError::InvalidPassword)?,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    credentials: Credentials,
    state: WifiState,
    #[cfg(feature = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(feature = "espidf"))]
    sim: SimRadio,
}

/// Host-side stand-in for the radio.
#[cfg(not(feature = "espidf"))]
#[derive(Debug, Clone)]
pub struct SimRadio {
    /// Whether the access point can be reached.
    pub in_range: bool,
    pub rssi: i8,
    pub connect_calls: u32,
}

#[cfg(not(feature = "espidf"))]
impl Default for SimRadio {
    fn default() -> Self {
        Self {
            in_range: true,
            rssi: -60,
            connect_calls: 0,
        }
    }
}

impl WifiAdapter {
    /// Wrap an ESP-IDF WiFi driver.  Nothing is started until the first
    /// connect attempt.
    #[cfg(feature = "espidf")]
    pub fn new(driver: BlockingWifi<EspWifi<'static>>, credentials: Credentials) -> Self {
        Self {
            credentials,
            state: WifiState::Disconnected,
            driver,
        }
    }

    #[cfg(not(feature = "espidf"))]
    pub fn simulated(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: WifiState::Disconnected,
            sim: SimRadio::default(),
        }
    }

    #[cfg(not(feature = "espidf"))]
    pub fn sim_mut(&mut self) -> &mut SimRadio {
        &mut self.sim
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Link RSSI in dBm; `None` while not associated.
    pub fn rssi(&self) -> Option<i8> {
        if !self.is_up() {
            return None;
        }
        self.platform_rssi()
    }

    pub fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        info!("WiFi: disconnected");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(feature = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        let auth_method = if self.credentials.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.credentials.ssid.clone(),
            password: self.credentials.password.clone(),
            auth_method,
            ..Default::default()
        });

        bring_up(&mut self.driver, &config).map_err(|e| {
            warn!("WiFi: driver error {e}");
            CommsError::WifiConnectFailed
        })
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.sim.connect_calls = self.sim.connect_calls.wrapping_add(1);
        if self.sim.in_range {
            Ok(())
        } else {
            Err(CommsError::WifiConnectFailed)
        }
    }

    #[cfg(feature = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi: disconnect failed: {e}");
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_disconnect(&mut self) {}

    #[cfg(feature = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.sim.in_range
    }

    #[cfg(feature = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        use esp_idf_svc::sys::{ESP_OK, esp_wifi_sta_get_ap_info, wifi_ap_record_t};

        // SAFETY: plain C struct, all-zero is a valid bit pattern.
        let mut ap_info: wifi_ap_record_t = unsafe { core::mem::zeroed() };
        // SAFETY: `ap_info` is a valid, exclusively borrowed out-parameter.
        let rc = unsafe { esp_wifi_sta_get_ap_info(&mut ap_info) };
        (rc == ESP_OK as i32).then_some(ap_info.rssi)
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        Some(self.sim.rssi)
    }
}

#[cfg(feature = "espidf")]
fn bring_up(
    driver: &mut BlockingWifi<EspWifi<'static>>,
    config: &Configuration,
) -> Result<(), esp_idf_svc::sys::EspError> {
    driver.set_configuration(config)?;
    if !driver.is_started()? {
        driver.start()?;
    }
    driver.connect()?;
    driver.wait_netif_up()
}

// ───────────────────────────────────────────────────────────────
// Reconnectable
// ───────────────────────────────────────────────────────────────

impl Reconnectable for WifiAdapter {
    fn name(&self) -> &'static str {
        "WiFi"
    }

    fn is_up(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    fn try_connect(&mut self) -> Result<(), CommsError> {
        info!("WiFi: connecting to '{}'", self.credentials.ssid());
        self.state = WifiState::Connecting;
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected (RSSI={:?})", self.platform_rssi());
                Ok(())
            }
            Err(e) => {
                self.state = WifiState::Disconnected;
                Err(e)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
