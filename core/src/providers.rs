//! External collaborator interfaces. Only the interfaces are specified
//! here — concrete upstream clients (KIS, DART, Naver, a broker API) are
//! out of scope for this repo.
//!
//! Modeled as capability-scoped traits rather than one "god" provider: a
//! caller that only needs prices depends on [`PriceProvider`], not on
//! disclosures or flows too.

use crate::ids::StockCode;
use crate::money::Won;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Market {
    Kospi,
    Kosdaq,
}

/// Error taxonomy a provider call can surface: a `ProviderTransient` /
/// `ProviderPermanent` split. Classification of an error as transient is
/// this layer's concern — retry policy lives in the caller (the ingestion
/// fan-out), not in the provider.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ProviderError {
    #[error("transient provider error: {0}")]
    Transient(String),
    #[error("permanent provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }

    /// Classifies a raw transport-level failure description using the fixed
    /// set: connection reset, EOF, timeout, connection refused are
    /// transient; everything else is permanent.
    pub fn classify(description: &str) -> ProviderError {
        let lower = description.to_ascii_lowercase();
        let transient = ["connection reset", "eof", "timeout", "connection refused"]
            .iter()
            .any(|needle| lower.contains(needle));
        if transient {
            ProviderError::Transient(description.to_string())
        } else {
            ProviderError::Permanent(description.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Won,
    pub high: Won,
    pub low: Won,
    pub close: Won,
    pub volume: u64,
    pub trading_value: Won,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CurrentPrice {
    pub close: Won,
    pub volume: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketCapEntry {
    pub code: StockCode,
    pub market_cap: Won,
    pub shares_outstanding: u64,
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_prices(
        &self,
        code: &StockCode,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyBar>, ProviderError>;

    async fn fetch_current_price(&self, code: &StockCode) -> Result<CurrentPrice, ProviderError>;

    async fn fetch_all_market_caps(
        &self,
        market: Market,
    ) -> Result<Vec<MarketCapEntry>, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowRecord {
    pub date: NaiveDate,
    pub foreign_net: Won,
    pub institution_net: Won,
    pub individual_net: Won,
}

#[async_trait]
pub trait InvestorFlowProvider: Send + Sync {
    async fn fetch_flow(
        &self,
        code: &StockCode,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FlowRecord>, ProviderError>;
}

/// Market classification carried on a disclosure item.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum CorpCls {
    Kospi,
    Kosdaq,
    Konex,
    Etc,
}

impl CorpCls {
    pub fn from_code(code: &str) -> CorpCls {
        match code {
            "Y" => CorpCls::Kospi,
            "K" => CorpCls::Kosdaq,
            "N" => CorpCls::Konex,
            _ => CorpCls::Etc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisclosureItem {
    pub corp_code: String,
    pub stock_code: Option<StockCode>,
    pub corp_cls: CorpCls,
    pub report_name: String,
    pub receipt_no: String,
    /// `YYYYMMDD`, kept as a raw string to match the upstream wire format.
    pub receipt_dt: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisclosurePage {
    pub items: Vec<DisclosureItem>,
    pub total_pages: u32,
}

#[async_trait]
pub trait DisclosureProvider: Send + Sync {
    async fn fetch_disclosures_page(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
    ) -> Result<DisclosurePage, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketTrend {
    pub trade_date: NaiveDate,
    pub foreign_net: Won,
    pub institution_net: Won,
    pub individual_net: Won,
}

#[async_trait]
pub trait MarketTrendProvider: Send + Sync {
    async fn fetch_market_trend(&self, index: Market) -> Result<MarketTrend, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BrokerPosition {
    pub code: StockCode,
    pub quantity: u64,
    pub average_price: Won,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BrokerBalance {
    pub cash: Won,
    pub positions: Vec<BrokerPosition>,
}

/// Consumed only by S6.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn get_balance(&self) -> Result<BrokerBalance, ProviderError>;

    async fn place_order(
        &self,
        code: &StockCode,
        side: crate::execution::Side,
        qty: u64,
        price: Won,
    ) -> Result<String, ProviderError>;

    async fn cancel_order(&self, order_id: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_transient_descriptions() {
        assert!(ProviderError::classify("Connection reset by peer").is_transient());
        assert!(ProviderError::classify("unexpected EOF").is_transient());
        assert!(ProviderError::classify("request timeout after 5s").is_transient());
        assert!(ProviderError::classify("connection refused").is_transient());
    }

    #[test]
    fn classifies_everything_else_as_permanent() {
        assert!(!ProviderError::classify("401 unauthorized").is_transient());
        assert!(!ProviderError::classify("malformed response body").is_transient());
    }

    #[test]
    fn corp_cls_mapping_matches_spec() {
        assert_eq!(CorpCls::from_code("Y"), CorpCls::Kospi);
        assert_eq!(CorpCls::from_code("K"), CorpCls::Kosdaq);
        assert_eq!(CorpCls::from_code("N"), CorpCls::Konex);
        assert_eq!(CorpCls::from_code("E"), CorpCls::Etc);
        assert_eq!(CorpCls::from_code("anything"), CorpCls::Etc);
    }
}
