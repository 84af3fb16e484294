//! S5 output: the target portfolio a pipeline run decides to hold.

use crate::ids::StockCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// One target holding within a [`TargetPortfolio`].
///
/// Invariant: `min_weight <= weight <= max_weight` (enforced by the S5
/// constructor, not by this type).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetPosition {
    pub code: StockCode,
    pub name: String,
    pub weight: Decimal,
    pub target_qty: u64,
    pub action: Action,
    pub reason: String,
}

/// `date` + target holdings + target cash weight, as produced by S5.
///
/// Invariants: `sum(positions[].weight) + cash == 1.0 ± eps`; no duplicate
/// codes; `positions.len()` within the configured holdings bounds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetPortfolio {
    pub date: NaiveDate,
    pub positions: Vec<TargetPosition>,
    pub cash: Decimal,
}

impl TargetPortfolio {
    /// A "no-trade" portfolio: everything in cash, no positions. Produced
    /// when S3 survives zero candidates.
    pub fn all_cash(date: NaiveDate) -> Self {
        Self {
            date,
            positions: Vec::new(),
            cash: Decimal::ONE,
        }
    }

    pub fn has_duplicate_codes(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        !self.positions.iter().all(|p| seen.insert(&p.code))
    }

    pub fn weight_sum_with_cash(&self) -> Decimal {
        self.positions.iter().map(|p| p.weight).sum::<Decimal>() + self.cash
    }
}
