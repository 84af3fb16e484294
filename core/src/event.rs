//! A detected surge/gap event used for forward-return forecast attribution.

use crate::ids::StockCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed-horizon forward returns measured from the event date.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ForwardReturns {
    pub d1: Option<Decimal>,
    pub d2: Option<Decimal>,
    pub d3: Option<Decimal>,
    pub d5: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    pub id: String,
    pub code: StockCode,
    pub date: NaiveDate,
    pub event_type: String,
    pub return_on_day: Decimal,
    pub forward_returns: ForwardReturns,
    pub max_runup: Decimal,
    pub max_drawdown: Decimal,
    pub gap_held: bool,
}
