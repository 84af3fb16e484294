//! The seven-stage decision pipeline: S0 Quality Gate through
//! S7 Audit Analyzer, tied together by [`orchestrator::run`]. Each stage
//! module exposes a pure `compute` function; [`persistence`] is the only
//! place artifacts cross an I/O boundary.

pub mod error;
pub mod normalization;
pub mod orchestrator;
pub mod persistence;
pub mod stage0_quality;
pub mod stage1_universe;
pub mod stage2_signals;
pub mod stage3_screener;
pub mod stage4_ranker;
pub mod stage5_portfolio;
pub mod stage6_execution;
pub mod stage7_audit;

pub use error::{PipelineError, Stage, StageError};
pub use orchestrator::{run, RunConfig, RunInputs, RunResult};
pub use persistence::{InMemoryPersistence, Persistence};
