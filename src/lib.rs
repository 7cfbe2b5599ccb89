//! PowerGuard firmware library.
//!
//! Power-loss detection and emergency actuation for a two-rail supply
//! monitored by an INA3221.  Exposes the pure-logic modules for
//! integration testing; all ESP-IDF-specific code is guarded by
//! `#[cfg(feature = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod light;
pub mod outage;
pub mod pins;
pub mod readings;
pub mod timers;
pub mod topics;

pub mod adapters;
pub mod drivers;
pub mod sensors;
