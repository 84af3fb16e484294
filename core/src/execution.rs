//! S6 output: child orders sliced from a target-portfolio diff.

use crate::ids::StockCode;
use crate::money::Won;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Terminal state recorded when an individual order's submission fails.
/// This never aborts the rest of the plan.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum OrderStatus {
    Planned,
    Submitted,
    PlanFailed,
}

/// A single child order. `price == Won(0)` means "market order".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub code: StockCode,
    pub side: Side,
    pub qty: u64,
    pub price: Won,
    pub slice_of: Option<String>,
    pub status: OrderStatus,
    pub estimated_slippage_bps: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_market(&self) -> bool {
        self.price == Won::ZERO
    }
}

/// `id` + `date` + child orders, as produced by S6.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecutionPlan {
    pub id: String,
    pub date: NaiveDate,
    pub orders: Vec<Order>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    pub fn empty(id: impl Into<String>, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            date,
            orders: Vec::new(),
            created_at,
        }
    }
}
