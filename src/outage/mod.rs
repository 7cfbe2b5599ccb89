//! Outage detection and outage energy accounting.
//!
//! ```text
//!  ReadingSet ──▶ OutageDetector ──[Began / Ended]──▶ PowerService
//!                      │
//!                      └──▶ EnergyIntegrator (primary rail, while active)
//! ```

pub mod detector;
pub mod energy;

pub use detector::{OutageDetector, OutageEdge, OutageOnset, OutageReport, OutageState};
pub use energy::EnergyIntegrator;
