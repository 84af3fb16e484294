//! Stub collaborator implementations used to exercise the ingestion
//! fan-out and the scheduler from the CLI. Real upstream HTTP clients for
//! KIS, DART and Naver are out of scope for this repo; these stand in for
//! them so `quant fetcher collect` has something concrete to drive.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use quant_core::ids::StockCode;
use quant_core::money::Won;
use quant_core::providers::{
    CurrentPrice, DailyBar, Market, MarketCapEntry, PriceProvider, ProviderError,
};

/// Returns one synthetic, deterministic bar per requested day. Named after
/// the data source the real client would talk to, purely for logging.
pub struct StubPriceProvider {
    pub source: &'static str,
}

#[async_trait]
impl PriceProvider for StubPriceProvider {
    async fn fetch_prices(
        &self,
        code: &StockCode,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        tracing::debug!(source = self.source, code = %code.as_str(), %from, %to, "stub price fetch");
        let mut bars = Vec::new();
        let mut day = from;
        while day <= to {
            bars.push(DailyBar {
                date: day,
                open: Won(10_000),
                high: Won(10_200),
                low: Won(9_900),
                close: Won(10_100),
                volume: 1_000,
                trading_value: Won(10_100_000),
            });
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(bars)
    }

    async fn fetch_current_price(&self, code: &StockCode) -> Result<CurrentPrice, ProviderError> {
        tracing::debug!(source = self.source, code = %code.as_str(), "stub current price fetch");
        Ok(CurrentPrice { close: Won(10_100), volume: 1_000, timestamp: Utc::now() })
    }

    async fn fetch_all_market_caps(
        &self,
        market: Market,
    ) -> Result<Vec<MarketCapEntry>, ProviderError> {
        tracing::debug!(source = self.source, ?market, "stub market cap fetch");
        Ok(Vec::new())
    }
}
