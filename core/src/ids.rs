//! Stable string identifiers used across every pipeline artifact.

use derive_more::{Constructor, Display, From};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A Korean-market stock code (e.g. `"005930"`). Always six digits in
/// practice, but the type does not enforce that — upstream providers are
/// the source of truth for validity.
#[derive(
    Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
#[serde(transparent)]
pub struct StockCode(pub String);

impl StockCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StockCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of a single orchestrator run, formatted `run_<YYYYMMDD_HHMMSS>`
/// with an optional disambiguator suffix (`_2`, `_3`, ...) when a second run
/// is started within the same calendar second.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(timestamp: chrono::DateTime<chrono::Utc>, disambiguator: u32) -> Self {
        let base = timestamp.format("run_%Y%m%d_%H%M%S");
        if disambiguator == 0 {
            Self(base.to_string())
        } else {
            Self(format!("{base}_{}", disambiguator + 1))
        }
    }
}

/// 64-character lowercase hex SHA-256 of a canonicalized strategy config.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, Constructor,
)]
#[serde(transparent)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 64 && self.0.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }
}

/// A trading strategy identifier, distinct from the run that executed it.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From)]
#[serde(transparent)]
pub struct StrategyId(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_id_disambiguator_appends_suffix() {
        let ts = chrono::Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
        assert_eq!(RunId::new(ts, 0).0, "run_20260801_090000");
        assert_eq!(RunId::new(ts, 1).0, "run_20260801_090000_2");
        assert_eq!(RunId::new(ts, 2).0, "run_20260801_090000_3");
    }

    #[test]
    fn config_hash_well_formed() {
        let good = ConfigHash::new("a".repeat(64));
        assert!(good.is_well_formed());
        let bad = ConfigHash::new("not-hex".to_string());
        assert!(!bad.is_well_formed());
    }
}
