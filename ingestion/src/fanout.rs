//! Ingestion fan-out: a bounded worker pool that fetches
//! one upstream price series per symbol concurrently. One symbol's failure
//! never aborts the batch — each outcome is recorded independently, and
//! only transient failures are retried.

use quant_core::ids::StockCode;
use quant_core::providers::{DailyBar, PriceProvider, ProviderError};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy)]
pub struct FanoutConfig {
    pub worker_count: usize,
    pub max_retries: u32,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self { worker_count: 8, max_retries: 3 }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub code: StockCode,
    pub result: Result<Vec<DailyBar>, ProviderError>,
    pub attempts: u32,
}

async fn fetch_with_retry<P: PriceProvider + ?Sized>(
    provider: &P,
    code: &StockCode,
    from: chrono::NaiveDate,
    to: chrono::NaiveDate,
    max_retries: u32,
) -> (Result<Vec<DailyBar>, ProviderError>, u32) {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match provider.fetch_prices(code, from, to).await {
            Ok(bars) => return (Ok(bars), attempts),
            Err(err) if err.is_transient() && attempts <= max_retries => {
                tracing::warn!(code = %code, attempt = attempts, "transient provider error, retrying");
                continue;
            }
            Err(err) => return (Err(err), attempts),
        }
    }
}

/// Fetches `from..=to` price history for every code in `codes`, spreading
/// the work over `config.worker_count` concurrent workers pulling off a
/// shared channel. Returns one [`FetchOutcome`] per input code, in
/// completion order (not input order — callers that need input order
/// should re-sort by `code`).
pub async fn fetch_all<P>(
    provider: Arc<P>,
    codes: Vec<StockCode>,
    from: chrono::NaiveDate,
    to: chrono::NaiveDate,
    config: FanoutConfig,
) -> Vec<FetchOutcome>
where
    P: PriceProvider + 'static,
{
    let (work_tx, work_rx) = mpsc::channel::<StockCode>(codes.len().max(1));
    for code in codes.iter().cloned() {
        let _ = work_tx.send(code).await;
    }
    drop(work_tx);

    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<FetchOutcome>(codes.len().max(1));

    let worker_count = config.worker_count.max(1).min(codes.len().max(1));
    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let provider = Arc::clone(&provider);
        let work_rx = Arc::clone(&work_rx);
        let result_tx = result_tx.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let code = {
                    let mut rx = work_rx.lock().await;
                    rx.recv().await
                };
                let Some(code) = code else { break };
                let (result, attempts) = fetch_with_retry(provider.as_ref(), &code, from, to, config.max_retries).await;
                let _ = result_tx.send(FetchOutcome { code, result, attempts }).await;
            }
        }));
    }
    drop(result_tx);

    let mut outcomes = Vec::with_capacity(codes.len());
    while let Some(outcome) = result_rx.recv().await {
        outcomes.push(outcome);
    }
    for handle in handles {
        let _ = handle.await;
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use quant_core::providers::{CurrentPrice, Market, MarketCapEntry};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        fail_once_for: StockCode,
        call_count: AtomicU32,
    }

    #[async_trait]
    impl PriceProvider for FlakyProvider {
        async fn fetch_prices(&self, code: &StockCode, _from: NaiveDate, _to: NaiveDate) -> Result<Vec<DailyBar>, ProviderError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if code == &self.fail_once_for && self.call_count.load(Ordering::SeqCst) == 1 {
                return Err(ProviderError::Transient("connection reset".to_string()));
            }
            Ok(vec![])
        }

        async fn fetch_current_price(&self, _code: &StockCode) -> Result<CurrentPrice, ProviderError> {
            unimplemented!()
        }

        async fn fetch_all_market_caps(&self, _market: Market) -> Result<Vec<MarketCapEntry>, ProviderError> {
            unimplemented!()
        }
    }

    struct AlwaysPermanentFailProvider;

    #[async_trait]
    impl PriceProvider for AlwaysPermanentFailProvider {
        async fn fetch_prices(&self, _code: &StockCode, _from: NaiveDate, _to: NaiveDate) -> Result<Vec<DailyBar>, ProviderError> {
            Err(ProviderError::Permanent("401 unauthorized".to_string()))
        }

        async fn fetch_current_price(&self, _code: &StockCode) -> Result<CurrentPrice, ProviderError> {
            unimplemented!()
        }

        async fn fetch_all_market_caps(&self, _market: Market) -> Result<Vec<MarketCapEntry>, ProviderError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn one_symbol_failure_does_not_abort_the_batch() {
        let provider = Arc::new(AlwaysPermanentFailProvider);
        let codes = vec![StockCode::from("A"), StockCode::from("B")];
        let outcomes = fetch_all(
            provider,
            codes,
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            FanoutConfig { worker_count: 2, max_retries: 0 },
        )
        .await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_err()));
    }

    #[tokio::test]
    async fn transient_error_is_retried_and_eventually_succeeds() {
        let provider = Arc::new(FlakyProvider { fail_once_for: StockCode::from("A"), call_count: AtomicU32::new(0) });
        let codes = vec![StockCode::from("A")];
        let outcomes = fetch_all(
            provider,
            codes,
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            FanoutConfig { worker_count: 1, max_retries: 3 },
        )
        .await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[0].attempts, 2);
    }
}
