//! Exit-monitor state: one record per open position.

use crate::ids::StockCode;
use crate::money::Won;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The exit monitor's state machine states, in their monotonic order.
/// `S5_CLOSED` is terminal and permanent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PositionState {
    S0Open = 0,
    S1Tp1 = 1,
    S2Tp2 = 2,
    S3Tp3 = 3,
    S4Exiting = 4,
    S5Closed = 5,
}

impl PositionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PositionState::S5Closed)
    }
}

/// One monitored open position. Mutated only by the exit monitor; every
/// field besides `remaining_quantity`, `state`, and `high_water_mark` is
/// fixed at entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitoredPosition {
    pub id: String,
    pub code: StockCode,
    pub entry_price: Won,
    pub initial_quantity: u64,
    pub remaining_quantity: u64,
    pub entry_time: DateTime<Utc>,
    pub state: PositionState,
    /// Monotonically non-decreasing once the position has a state >= `S1Tp1`.
    pub high_water_mark: Won,
}

impl MonitoredPosition {
    pub fn open(
        id: impl Into<String>,
        code: StockCode,
        entry_price: Won,
        quantity: u64,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            code,
            entry_price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
            entry_time,
            state: PositionState::S0Open,
            high_water_mark: entry_price,
        }
    }

    pub fn pnl_pct(&self, price: Won) -> Decimal {
        if self.entry_price.0 == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(price.0 - self.entry_price.0) / Decimal::from(self.entry_price.0)
    }
}
