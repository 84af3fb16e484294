#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]

//! # Contracts
//!
//! Cross-stage value types and provider interfaces shared by every crate in
//! the decision pipeline engine. This crate is intentionally inert: it
//! defines data and trait boundaries only, never computation. Stages
//! (`quant-pipeline`), the exit monitor (`quant-risk`), and ingestion
//! (`quant-ingestion`) all depend on this crate and nothing flows the other
//! way.
//!
//! ## Layout
//!
//! - [`ids`] — stable string identifiers (`StockCode`, `RunId`, ...)
//! - [`money`] — integer minor-unit monetary values and weight validation
//! - [`quality`] — S0 output: [`quality::DataQualitySnapshot`]
//! - [`universe`] — S1 output: [`universe::Universe`]
//! - [`signals`] — S2 output: [`signals::SignalSet`]
//! - [`ranking`] — S4 output: [`ranking::RankedStock`]
//! - [`portfolio`] — S5 output: [`portfolio::TargetPortfolio`]
//! - [`execution`] — S6 output: [`execution::ExecutionPlan`]
//! - [`position`] — exit-monitor state: [`position::MonitoredPosition`]
//! - [`event`] — forecast attribution: [`event::Event`]
//! - [`snapshot`] — reproducibility record: [`snapshot::DecisionSnapshot`]
//! - [`providers`] — external collaborator interfaces
//! - [`disclosure`] — disclosure classification helpers
//! - [`shutdown`] — graceful shutdown primitives
//! - [`cancellation`] — the single cancellation signal

pub mod cancellation;
pub mod disclosure;
pub mod event;
pub mod execution;
pub mod ids;
pub mod money;
pub mod portfolio;
pub mod position;
pub mod providers;
pub mod quality;
pub mod ranking;
pub mod shutdown;
pub mod signals;
pub mod snapshot;
pub mod universe;

pub use ids::{ConfigHash, RunId, StockCode};
pub use money::Won;
