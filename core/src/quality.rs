//! S0 output: per-day data coverage and quality gate result.

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-day coverage snapshot produced by the S0 quality gate.
///
/// Invariant: `valid_stocks <= total_stocks`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataQualitySnapshot {
    pub date: NaiveDate,
    pub total_stocks: u32,
    pub valid_stocks: u32,
    /// Source name -> coverage ratio in `[0, 1]`.
    pub coverage: IndexMap<String, Decimal>,
    pub quality_score: Decimal,
    pub passed: bool,
}

impl DataQualitySnapshot {
    pub fn is_valid(&self) -> bool {
        self.valid_stocks <= self.total_stocks
    }
}
