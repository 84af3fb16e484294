//! The run orchestrator: each stage is `compute` then `persist`, stages run
//! strictly in order S0..S7, and a failure at any stage records
//! `(run_id, stage, outcome)` before propagating. Replaying the same
//! `(config_hash, data_snapshot_id, git_sha)` triple must produce
//! byte-identical artifacts.

use crate::error::{PipelineError, Stage, StageError};
use crate::persistence::{Persistence, StageOutcome};
use crate::stage0_quality::{self, QualityInputs};
use crate::stage1_universe::{self, SymbolAttributes};
use crate::stage2_signals::{self, RawSymbolInputs};
use crate::stage3_screener::{self, DrawdownInputs, ScreenCandidate};
use crate::stage4_ranker;
use crate::stage5_portfolio::{self, CandidateMeta, CurrentHolding};
use crate::stage6_execution::{self, ExecutionInput};
use crate::stage7_audit::{self, DailyReturn};
use chrono::{DateTime, NaiveDate, Utc};
use quant_config::schema::StrategyConfig;
use quant_core::execution::ExecutionPlan;
use quant_core::ids::{ConfigHash, RunId, StockCode, StrategyId};
use quant_core::money::Won;
use quant_core::portfolio::TargetPortfolio;
use quant_core::quality::DataQualitySnapshot;
use quant_core::ranking::RankedStock;
use quant_core::signals::SignalSet;
use quant_core::snapshot::DecisionSnapshot;
use quant_core::universe::Universe;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub run_id: RunId,
    pub date: NaiveDate,
    pub git_sha: String,
    pub data_snapshot_id: String,
    pub capital: Won,
    /// When `true`, S6 is skipped entirely — the run stops after S5.
    pub dry_run: bool,
    /// When `true`, a failed S0 gate does not abort the run.
    pub quality_override: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RunInputs {
    pub quality: QualityInputs,
    pub symbols: Vec<SymbolAttributes>,
    pub signal_inputs: Vec<RawSymbolInputs>,
    pub drawdown_by_code: BTreeMap<StockCode, DrawdownInputs>,
    pub portfolio_meta: BTreeMap<StockCode, CandidateMeta>,
    pub current_holdings: BTreeMap<StockCode, CurrentHolding>,
    pub execution_inputs: BTreeMap<StockCode, (Won, Won)>,
    /// Historical daily returns for S7; `None` skips the audit stage.
    pub historical_returns: Option<Vec<DailyReturn>>,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: RunId,
    pub quality_snapshot: DataQualitySnapshot,
    pub universe: Universe,
    pub signals: SignalSet,
    pub ranked: Vec<RankedStock>,
    pub portfolio: TargetPortfolio,
    pub execution_plan: Option<ExecutionPlan>,
    pub decision_snapshot: DecisionSnapshot,
}

fn record_outcome(
    persistence: &mut dyn Persistence,
    run_id: &RunId,
    stage: Stage,
    outcome: &str,
) -> Result<(), PipelineError> {
    persistence
        .save_stage_outcome(&StageOutcome {
            run_id: run_id.clone(),
            stage: stage.to_string(),
            outcome: outcome.to_string(),
        })
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage,
            source: StageError::Persistence(e.0),
        })
}

/// Runs the full S0..S7 pipeline once. Stages execute strictly in order;
/// `persistence` receives every intermediate artifact so a failure midway
/// leaves a recoverable, inspectable trail.
pub fn run(
    config: &RunConfig,
    strategy_config: &StrategyConfig,
    config_hash: ConfigHash,
    raw_yaml: Vec<u8>,
    inputs: RunInputs,
    persistence: &mut dyn Persistence,
) -> Result<RunResult, PipelineError> {
    let run_id = config.run_id.clone();
    tracing::info!(run_id = %run_id, date = %config.date, dry_run = config.dry_run, "starting pipeline run");

    // S0: Quality Gate.
    let quality_snapshot = stage0_quality::compute(&inputs.quality, &strategy_config.meta);
    persistence
        .save_quality_snapshot(&quality_snapshot)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S0Quality,
            source: StageError::Persistence(e.0),
        })?;

    if !quality_snapshot.passed && !config.quality_override {
        record_outcome(persistence, &run_id, Stage::S0Quality, "FAILED")?;
        tracing::warn!(run_id = %run_id, quality_score = %quality_snapshot.quality_score, "quality gate failed, aborting run");
        return Err(PipelineError::StageFailed {
            run_id,
            stage: Stage::S0Quality,
            source: StageError::quality_failure(
                quality_snapshot.quality_score,
                strategy_config.meta.quality_threshold,
            ),
        });
    }
    record_outcome(
        persistence,
        &run_id,
        Stage::S0Quality,
        if quality_snapshot.passed { "PASSED" } else { "OVERRIDDEN" },
    )?;

    // S1: Universe Builder.
    let universe = stage1_universe::compute(config.date, &inputs.symbols, &strategy_config.universe);
    persistence
        .save_universe(&universe)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S1Universe,
            source: StageError::Persistence(e.0),
        })?;
    record_outcome(persistence, &run_id, Stage::S1Universe, "DONE")?;

    // S2: Signal Builder (restricted to the surviving universe).
    let universe_set: std::collections::HashSet<&StockCode> = universe.stocks.iter().collect();
    let signal_inputs: Vec<RawSymbolInputs> = inputs
        .signal_inputs
        .into_iter()
        .filter(|s| universe_set.contains(&s.code))
        .collect();
    let signals = stage2_signals::compute(config.date, &signal_inputs, &strategy_config.signals);
    persistence
        .save_signal_set(&signals)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S2Signals,
            source: StageError::Persistence(e.0),
        })?;
    record_outcome(persistence, &run_id, Stage::S2Signals, "DONE")?;

    // S3: Screener.
    let candidates: Vec<(StockCode, ScreenCandidate)> = signals
        .signals
        .iter()
        .map(|(code, stock_signals)| {
            let drawdown = inputs
                .drawdown_by_code
                .get(code)
                .cloned()
                .unwrap_or(DrawdownInputs { return_1d: Default::default(), return_5d: Default::default() });
            (
                code.clone(),
                ScreenCandidate { signals: stock_signals.clone(), drawdown },
            )
        })
        .collect();
    let screening = stage3_screener::compute(config.date, candidates, &strategy_config.screening);
    persistence
        .save_screening_result(&screening)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S3Screener,
            source: StageError::Persistence(e.0),
        })?;
    record_outcome(persistence, &run_id, Stage::S3Screener, "DONE")?;

    if screening.survivors.is_empty() {
        // Recoverable: no tradable names survived, the decision is all-cash.
        tracing::warn!(run_id = %run_id, "screener produced zero survivors, falling back to all-cash portfolio");
        record_outcome(persistence, &run_id, Stage::S4Ranker, "SKIPPED_EMPTY_UNIVERSE")?;
        let portfolio = TargetPortfolio::all_cash(config.date);
        persistence
            .save_target_portfolio(&portfolio)
            .map_err(|e| PipelineError::StageFailed {
                run_id: run_id.clone(),
                stage: Stage::S5Portfolio,
                source: StageError::Persistence(e.0),
            })?;
        let decision_snapshot = build_snapshot(config, &strategy_config.meta.strategy_id, config_hash, raw_yaml);
        persistence
            .save_decision_snapshot(&decision_snapshot)
            .map_err(|e| PipelineError::StageFailed {
                run_id: run_id.clone(),
                stage: Stage::S7Audit,
                source: StageError::Persistence(e.0),
            })?;
        return Ok(RunResult {
            run_id,
            quality_snapshot,
            universe,
            signals,
            ranked: Vec::new(),
            portfolio,
            execution_plan: None,
            decision_snapshot,
        });
    }

    // S4: Ranker.
    let survivor_signals: Vec<_> = screening
        .survivors
        .iter()
        .filter_map(|code| signals.signals.get(code).cloned())
        .collect();
    let ranked = stage4_ranker::compute(&survivor_signals, &strategy_config.ranking.weights_pct);
    persistence
        .save_ranked(&ranked)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S4Ranker,
            source: StageError::Persistence(e.0),
        })?;
    record_outcome(persistence, &run_id, Stage::S4Ranker, "DONE")?;

    // S5: Portfolio Constructor.
    let portfolio = stage5_portfolio::compute(
        config.date,
        &ranked,
        &inputs.portfolio_meta,
        &inputs.current_holdings,
        config.capital,
        &strategy_config.portfolio,
    );
    persistence
        .save_target_portfolio(&portfolio)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S5Portfolio,
            source: StageError::Persistence(e.0),
        })?;
    record_outcome(persistence, &run_id, Stage::S5Portfolio, "DONE")?;

    // S6: Execution Planner (skipped in dry-run).
    let execution_plan = if config.dry_run {
        record_outcome(persistence, &run_id, Stage::S6Execution, "SKIPPED_DRY_RUN")?;
        None
    } else {
        let execution_inputs: Vec<ExecutionInput> = portfolio
            .positions
            .iter()
            .filter_map(|pos| {
                let (adtv20, mid_price) = inputs.execution_inputs.get(&pos.code).copied()?;
                let current_qty = inputs.current_holdings.get(&pos.code).map(|h| h.quantity).unwrap_or(0);
                Some(ExecutionInput {
                    code: pos.code.clone(),
                    target_qty: pos.target_qty,
                    current_qty,
                    adtv20,
                    mid_price,
                })
            })
            .collect();
        let plan = stage6_execution::compute(
            run_id.0.as_str(),
            config.date,
            &execution_inputs,
            strategy_config.portfolio.liquidity_caps.max_order_to_adtv20_pct,
            &strategy_config.execution,
            config.created_at,
        );
        persistence
            .save_execution_plan(&plan)
            .map_err(|e| PipelineError::StageFailed {
                run_id: run_id.clone(),
                stage: Stage::S6Execution,
                source: StageError::Persistence(e.0),
            })?;
        record_outcome(persistence, &run_id, Stage::S6Execution, "DONE")?;
        Some(plan)
    };

    // S7: Audit Analyzer — runs whenever S0 didn't abort the pipeline,
    // but only produces a report when historical returns were supplied.
    if let Some(returns) = &inputs.historical_returns {
        let report = stage7_audit::compute(
            run_id.clone(),
            StrategyId::from(strategy_config.meta.strategy_id.clone()),
            returns,
            strategy_config.backtest_costs.risk_free_rate,
        );
        persistence
            .save_audit_report(&report)
            .map_err(|e| PipelineError::StageFailed {
                run_id: run_id.clone(),
                stage: Stage::S7Audit,
                source: StageError::Persistence(e.0),
            })?;
        record_outcome(persistence, &run_id, Stage::S7Audit, "DONE")?;
    } else {
        record_outcome(persistence, &run_id, Stage::S7Audit, "SKIPPED_NO_HISTORY")?;
    }

    let decision_snapshot = build_snapshot(config, &strategy_config.meta.strategy_id, config_hash, raw_yaml);
    persistence
        .save_decision_snapshot(&decision_snapshot)
        .map_err(|e| PipelineError::StageFailed {
            run_id: run_id.clone(),
            stage: Stage::S7Audit,
            source: StageError::Persistence(e.0),
        })?;

    tracing::info!(run_id = %run_id, "pipeline run complete");
    Ok(RunResult {
        run_id,
        quality_snapshot,
        universe,
        signals,
        ranked,
        portfolio,
        execution_plan,
        decision_snapshot,
    })
}

fn build_snapshot(
    config: &RunConfig,
    strategy_id: &str,
    config_hash: ConfigHash,
    raw_yaml: Vec<u8>,
) -> DecisionSnapshot {
    DecisionSnapshot {
        run_id: config.run_id.clone(),
        config_hash,
        config_yaml: raw_yaml,
        strategy_id: StrategyId::from(strategy_id.to_string()),
        git_commit: config.git_sha.clone(),
        data_snapshot_id: config.data_snapshot_id.clone(),
        decision_date: config.date,
        created_at: config.created_at,
    }
}
