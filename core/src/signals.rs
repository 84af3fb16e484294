//! S2 output: per-symbol factor scores and the raw inputs the screener needs.

use crate::ids::StockCode;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The six normalized factor scores computed for one symbol on one date.
///
/// Invariant: no factor score is ever NaN — missing raw inputs are mapped to
/// a configured neutral value upstream, before scores reach this type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockSignals {
    pub code: StockCode,
    pub momentum: Decimal,
    pub technical: Decimal,
    pub value: Decimal,
    pub quality: Decimal,
    pub flow: Decimal,
    pub event: Decimal,
    pub details: StockSignalDetails,
}

impl StockSignals {
    /// Iterates the six factor scores by name, in the canonical order used
    /// by the ranker's weighted sum.
    pub fn factors(&self) -> [(&'static str, Decimal); 6] {
        [
            ("momentum", self.momentum),
            ("technical", self.technical),
            ("value", self.value),
            ("quality", self.quality),
            ("flow", self.flow),
            ("event", self.event),
        ]
    }
}

/// Raw inputs the S3 screener needs, carried alongside the normalized
/// scores so screening can apply absolute thresholds on un-normalized
/// fundamentals.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct StockSignalDetails {
    pub per: Option<Decimal>,
    pub pbr: Option<Decimal>,
    pub roe: Option<Decimal>,
    pub debt_ratio: Option<Decimal>,
    pub return_1d: Option<Decimal>,
    pub return_5d: Option<Decimal>,
    pub volatility_20d: Option<Decimal>,
    pub events: Vec<EventTag>,
}

/// A single recent-disclosure event tag carried into the screener/ranker for
/// the `event` factor and for Phase-1 screening rules that key off event
/// presence.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventTag {
    pub event_type: String,
    pub date: NaiveDate,
    /// Decayed weight in `[0, 1]`; `1.0` on the disclosure date, decaying to
    /// `0.0` once the event's TTL has elapsed.
    pub decay: Decimal,
}

/// `date` + per-symbol [`StockSignals`], as persisted by S2.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SignalSet {
    pub date: NaiveDate,
    pub signals: IndexMap<StockCode, StockSignals>,
}

impl SignalSet {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            signals: IndexMap::new(),
        }
    }
}
