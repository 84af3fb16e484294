//! S4 output: weighted-sum ranking of screened survivors.

use crate::ids::StockCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-factor contribution to `total_score`, kept alongside the total for
/// downstream factor attribution (S7).
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ScoreDetail {
    pub momentum: Decimal,
    pub technical: Decimal,
    pub value: Decimal,
    pub quality: Decimal,
    pub flow: Decimal,
    pub event: Decimal,
}

/// One ranked stock. `rank` is 1-based.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RankedStock {
    pub code: StockCode,
    pub rank: u32,
    pub total_score: Decimal,
    pub scores: ScoreDetail,
}
