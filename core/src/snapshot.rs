//! The reproducibility record: one immutable row per pipeline run.

use crate::ids::{ConfigHash, RunId, StrategyId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Keys a pipeline run to the exact config, data snapshot, and code that
/// produced it. Insert-only: never updated after write.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DecisionSnapshot {
    pub run_id: RunId,
    pub config_hash: ConfigHash,
    pub config_yaml: Vec<u8>,
    pub strategy_id: StrategyId,
    pub git_commit: String,
    pub data_snapshot_id: String,
    pub decision_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl DecisionSnapshot {
    /// The `(config_hash, data_snapshot_id, git_sha)` replay key used to
    /// identify a reproducible run.
    pub fn replay_key(&self) -> (String, String, String) {
        (
            self.config_hash.0.clone(),
            self.data_snapshot_id.clone(),
            self.git_commit.clone(),
        )
    }
}
