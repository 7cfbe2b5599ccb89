//! GPIO / peripheral pin assignments for the PowerGuard main board.
//!
//! `main` claims every GPIO by these numbers (see `BoardPins::claim`), so
//! rewiring the board is a change to this file only.

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Status indicator LED (active HIGH).
pub const STATUS_INDICATOR_GPIO: i32 = 2;
/// System power relay coil driver (active LOW).
pub const SYSTEM_RELAY_GPIO: i32 = 13;
/// Auxiliary pulse-triggered relay (active LOW, idles HIGH).
pub const AUX_RELAY_GPIO: i32 = 14;
/// Emergency light driver (active LOW).
pub const EMERGENCY_LIGHT_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Light-level sensor, 3-bit parallel output
// ---------------------------------------------------------------------------

pub const LIGHT_B0_GPIO: i32 = 32;
pub const LIGHT_B1_GPIO: i32 = 33;
/// Input-only pin on the ESP32.
pub const LIGHT_B2_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// I²C bus, INA3221 power monitor
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// INA3221 with A0 tied to GND.
pub const INA3221_ADDR: u8 = 0x40;
/// Bus clock for the power monitor.
pub const I2C_FREQ_HZ: u32 = 100_000;
