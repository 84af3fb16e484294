//! Error taxonomy for the orchestrator and its stages.

use quant_core::ids::RunId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("data quality gate failed: score {score} below threshold {threshold}")]
    DataQualityFailure { score: String, threshold: String },

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("invalid stage input: {0}")]
    InvalidInput(String),
}

impl StageError {
    pub fn quality_failure(score: Decimal, threshold: Decimal) -> Self {
        StageError::DataQualityFailure {
            score: score.to_string(),
            threshold: threshold.to_string(),
        }
    }
}

/// The name of the stage a failed/cancelled run stopped at.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    S0Quality,
    S1Universe,
    S2Signals,
    S3Screener,
    S4Ranker,
    S5Portfolio,
    S6Execution,
    S7Audit,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::S0Quality => "S0",
            Stage::S1Universe => "S1",
            Stage::S2Signals => "S2",
            Stage::S3Screener => "S3",
            Stage::S4Ranker => "S4",
            Stage::S5Portfolio => "S5",
            Stage::S6Execution => "S6",
            Stage::S7Audit => "S7",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("run {run_id} aborted at stage {stage}: {source}")]
    StageFailed {
        run_id: RunId,
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("run {run_id} cancelled at stage {stage}")]
    Cancelled { run_id: RunId, stage: Stage },
}
