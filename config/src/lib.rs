#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]

//! # Config Loader
//!
//! Parses and validates the strategy config YAML, and computes the
//! `config_hash` that keys every [`DecisionSnapshot`] to its exact
//! configuration.
//!
//! [`DecisionSnapshot`]: quant_core::snapshot::DecisionSnapshot

pub mod error;
pub mod hash;
pub mod loader;
pub mod schema;
pub mod validate;

pub use error::ConfigError;
pub use loader::{load_config, LoadedConfig};
pub use schema::StrategyConfig;
