use anyhow::{bail, Result};
use clap::Parser;
use quant::cli::{Cli, Commands, FetcherCommands, Source};
use quant::providers::StubPriceProvider;
use quant_core::ids::StockCode;
use quant_core::providers::{Market, PriceProvider};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        quant::logging::init_json_logging();
    } else {
        quant::logging::init_logging();
    }

    match cli.command {
        Commands::Fetcher { command } => match command {
            FetcherCommands::Collect { source, codes, from, to } => {
                collect(source, codes, from, to).await
            }
            FetcherCommands::Marketcap => marketcap().await,
        },
    }
}

async fn collect(source: Source, codes: Vec<String>, from: chrono::NaiveDate, to: chrono::NaiveDate) -> Result<()> {
    let sources: Vec<&'static str> = match source {
        Source::All => vec!["kis", "dart", "naver"],
        other => vec![other.label()],
    };
    let stock_codes: Vec<StockCode> = codes.iter().map(|c| StockCode::from(c.as_str())).collect();

    let mut any_failed = false;
    for label in sources {
        let provider = Arc::new(StubPriceProvider { source: label });
        let outcomes = quant_ingestion::fetch_all(
            provider,
            stock_codes.clone(),
            from,
            to,
            quant_ingestion::FanoutConfig::default(),
        )
        .await;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(bars) => tracing::info!(
                    source = label,
                    code = %outcome.code.as_str(),
                    bars = bars.len(),
                    attempts = outcome.attempts,
                    "collected"
                ),
                Err(err) => {
                    any_failed = true;
                    tracing::error!(source = label, code = %outcome.code.as_str(), %err, "collection failed");
                }
            }
        }
        println!("{label}: {} codes processed", outcomes.len());
    }

    if any_failed {
        bail!("one or more symbols failed collection");
    }
    Ok(())
}

async fn marketcap() -> Result<()> {
    let provider = StubPriceProvider { source: "kis" };
    let mut total = 0usize;
    for market in [Market::Kospi, Market::Kosdaq] {
        let entries = provider.fetch_all_market_caps(market).await?;
        total += entries.len();
        println!("{market:?}: {} entries", entries.len());
    }
    tracing::info!(total, "market cap collection complete");
    Ok(())
}
