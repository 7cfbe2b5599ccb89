//! Application core: pure domain logic, zero I/O.
//!
//! Outage handling, the emergency sequence, the light policy and the
//! remote-command rules.  All interaction with hardware and networks
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod chat;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
