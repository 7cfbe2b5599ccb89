//! Output drivers: polarity-aware relays and the board's output bank.

pub mod outputs;
pub mod relay;
