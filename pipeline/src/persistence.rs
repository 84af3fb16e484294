//! The replayability contract: every stage is `compute(inputs) -> artifact`
//! followed by `persist(artifact)`. `Persistence` is the write boundary; a
//! concrete relational implementation is out of scope — only the trait and
//! an in-memory reference implementation used by
//! tests live here.

use indexmap::IndexMap;
use quant_core::execution::ExecutionPlan;
use quant_core::ids::{RunId, StockCode};
use quant_core::portfolio::TargetPortfolio;
use quant_core::quality::DataQualitySnapshot;
use quant_core::ranking::RankedStock;
use quant_core::signals::SignalSet;
use quant_core::snapshot::DecisionSnapshot;
use quant_core::universe::Universe;
use thiserror::Error;

use crate::stage3_screener::ScreeningResult;
use crate::stage7_audit::AuditReport;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("persistence failure: {0}")]
pub struct PersistError(pub String);

/// One row per `(run_id, stage, outcome)`, so a partial failure leaves a
/// recoverable trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub run_id: RunId,
    pub stage: String,
    pub outcome: String,
}

pub trait Persistence {
    fn save_quality_snapshot(&mut self, snapshot: &DataQualitySnapshot) -> Result<(), PersistError>;
    fn save_universe(&mut self, universe: &Universe) -> Result<(), PersistError>;
    fn save_signal_set(&mut self, signals: &SignalSet) -> Result<(), PersistError>;
    fn save_screening_result(&mut self, result: &ScreeningResult) -> Result<(), PersistError>;
    fn save_ranked(&mut self, ranked: &[RankedStock]) -> Result<(), PersistError>;
    fn save_target_portfolio(&mut self, portfolio: &TargetPortfolio) -> Result<(), PersistError>;
    fn save_execution_plan(&mut self, plan: &ExecutionPlan) -> Result<(), PersistError>;
    fn save_audit_report(&mut self, report: &AuditReport) -> Result<(), PersistError>;
    fn save_decision_snapshot(&mut self, snapshot: &DecisionSnapshot) -> Result<(), PersistError>;
    fn save_stage_outcome(&mut self, outcome: &StageOutcome) -> Result<(), PersistError>;
}

/// Reference in-memory [`Persistence`] implementation, used by tests and by
/// the `quant` CLI in dry-run mode.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    pub quality_snapshots: Vec<DataQualitySnapshot>,
    pub universes: Vec<Universe>,
    pub signal_sets: Vec<SignalSet>,
    pub screening_results: Vec<ScreeningResult>,
    pub ranked: Vec<Vec<RankedStock>>,
    pub target_portfolios: Vec<TargetPortfolio>,
    pub execution_plans: Vec<ExecutionPlan>,
    pub audit_reports: Vec<AuditReport>,
    pub decision_snapshots: Vec<DecisionSnapshot>,
    pub stage_outcomes: Vec<StageOutcome>,
    /// Simulates the `(date, code)` upsert keying used by real storage.
    pub latest_signals_by_code: IndexMap<StockCode, ()>,
}

impl Persistence for InMemoryPersistence {
    fn save_quality_snapshot(&mut self, snapshot: &DataQualitySnapshot) -> Result<(), PersistError> {
        self.quality_snapshots.push(snapshot.clone());
        Ok(())
    }

    fn save_universe(&mut self, universe: &Universe) -> Result<(), PersistError> {
        self.universes.push(universe.clone());
        Ok(())
    }

    fn save_signal_set(&mut self, signals: &SignalSet) -> Result<(), PersistError> {
        for code in signals.signals.keys() {
            self.latest_signals_by_code.insert(code.clone(), ());
        }
        self.signal_sets.push(signals.clone());
        Ok(())
    }

    fn save_screening_result(&mut self, result: &ScreeningResult) -> Result<(), PersistError> {
        self.screening_results.push(result.clone());
        Ok(())
    }

    fn save_ranked(&mut self, ranked: &[RankedStock]) -> Result<(), PersistError> {
        self.ranked.push(ranked.to_vec());
        Ok(())
    }

    fn save_target_portfolio(&mut self, portfolio: &TargetPortfolio) -> Result<(), PersistError> {
        self.target_portfolios.push(portfolio.clone());
        Ok(())
    }

    fn save_execution_plan(&mut self, plan: &ExecutionPlan) -> Result<(), PersistError> {
        self.execution_plans.push(plan.clone());
        Ok(())
    }

    fn save_audit_report(&mut self, report: &AuditReport) -> Result<(), PersistError> {
        self.audit_reports.push(report.clone());
        Ok(())
    }

    fn save_decision_snapshot(&mut self, snapshot: &DecisionSnapshot) -> Result<(), PersistError> {
        self.decision_snapshots.push(snapshot.clone());
        Ok(())
    }

    fn save_stage_outcome(&mut self, outcome: &StageOutcome) -> Result<(), PersistError> {
        self.stage_outcomes.push(outcome.clone());
        Ok(())
    }
}
