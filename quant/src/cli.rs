//! Command-line surface: `quant fetcher collect {kis|dart|naver|all}` and
//! `quant fetcher marketcap`.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "quant", author, version, about = "Korean equity decision pipeline engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit structured JSON logs instead of human-readable ones.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingestion fan-out operations.
    Fetcher {
        #[command(subcommand)]
        command: FetcherCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum FetcherCommands {
    /// Collects daily price bars from the named source for a set of codes.
    Collect {
        source: Source,
        #[arg(long, value_delimiter = ',', default_value = "005930,000660")]
        codes: Vec<String>,
        #[arg(long)]
        from: chrono::NaiveDate,
        #[arg(long)]
        to: chrono::NaiveDate,
    },
    /// Collects the full market-cap table for KOSPI and KOSDAQ.
    Marketcap,
}

#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Source {
    Kis,
    Dart,
    Naver,
    All,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Kis => "kis",
            Source::Dart => "dart",
            Source::Naver => "naver",
            Source::All => "all",
        }
    }
}
