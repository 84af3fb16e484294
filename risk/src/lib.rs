//! The exit monitor: a position-level stop-loss/take-profit state machine
//! that runs independently of the seven-stage decision pipeline, driven by
//! live price ticks rather than the daily batch cycle.

pub mod atr;
pub mod exit_monitor;

pub use exit_monitor::{apply, evaluate, ExitDecision, ExitReason};
