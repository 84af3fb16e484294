//! S1 output: the investable set for a trading date.

use crate::ids::StockCode;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Investable set for a date.
///
/// Invariant: `stocks.len() + excluded.len() == total_count`, and no code
/// appears in both `stocks` and `excluded`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Universe {
    pub date: NaiveDate,
    pub stocks: Vec<StockCode>,
    pub excluded: IndexMap<StockCode, String>,
    pub total_count: u32,
}

impl Universe {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            stocks: Vec::new(),
            excluded: IndexMap::new(),
            total_count: 0,
        }
    }

    /// Checks that no stock is both included and excluded and that the
    /// totals are consistent.
    pub fn is_consistent(&self) -> bool {
        let no_overlap = self
            .stocks
            .iter()
            .all(|code| !self.excluded.contains_key(code));
        let counts_match = self.stocks.len() + self.excluded.len() == self.total_count as usize;
        no_overlap && counts_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_universe_is_consistent() {
        let universe = Universe::empty(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert!(universe.is_consistent());
        assert!(universe.stocks.is_empty());
    }

    #[test]
    fn overlapping_code_is_inconsistent() {
        let mut universe = Universe::empty(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        universe.stocks.push(StockCode::from("005930"));
        universe
            .excluded
            .insert(StockCode::from("005930"), "halted".to_string());
        universe.total_count = 1;
        assert!(!universe.is_consistent());
    }

    #[test]
    fn mismatched_total_count_is_inconsistent() {
        let mut universe = Universe::empty(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        universe.stocks.push(StockCode::from("005930"));
        universe.total_count = 5;
        assert!(!universe.is_consistent());
    }
}
