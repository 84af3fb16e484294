//! Strategy config schema: the recognized top-level sections are
//! `meta, universe, signals, screening, ranking, portfolio, execution,
//! exit, risk_overlay, backtest_costs`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyConfig {
    pub meta: MetaConfig,
    pub universe: UniverseConfig,
    pub signals: SignalsConfig,
    pub screening: ScreeningConfig,
    pub ranking: RankingConfig,
    pub portfolio: PortfolioConfig,
    pub execution: ExecutionConfig,
    pub exit: ExitConfig,
    #[serde(default)]
    pub risk_overlay: RiskOverlayConfig,
    #[serde(default)]
    pub backtest_costs: BacktestCostsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetaConfig {
    pub strategy_id: String,
    pub capital: i64,
    /// S0 quality gate: `passed = quality_score >= quality_threshold`.
    pub quality_threshold: Decimal,
    /// Per-source weight used in the S0 weighted-average quality score.
    pub source_weights: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UniverseConfig {
    pub exclude_halt: bool,
    pub exclude_admin: bool,
    pub exclude_spac: bool,
    /// 억 won (1억 = 100,000,000 won).
    pub min_market_cap_eok: Decimal,
    /// 백만 won (1백만 = 1,000,000 won).
    pub min_volume_mm: Decimal,
    pub min_listing_days: u32,
    #[serde(default)]
    pub excluded_sectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NormalizationConfig {
    pub winsorize_pct: Decimal,
    pub zscore_clip: Decimal,
    pub score_min: Decimal,
    pub score_max: Decimal,
    pub neutral_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MomentumConfig {
    /// Lookback (trading days) -> weight. Weights must sum to 1.0.
    pub lookback_weights: BTreeMap<u32, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TechnicalConfig {
    pub rsi_period: u32,
    pub macd_fast: u32,
    pub macd_slow: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ValueConfig {
    pub per_weight: Decimal,
    pub pbr_weight: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct QualityConfig {
    pub roe_weight: Decimal,
    pub debt_ratio_weight: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowConfig {
    /// Actor ("foreign" | "institution" | "individual") x horizon (days) ->
    /// weight.
    pub actor_horizon_weights: BTreeMap<String, BTreeMap<u32, Decimal>>,
    pub normalize_by_turnover: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventConfig {
    pub ttl_days: u32,
    #[serde(default)]
    pub tracked_report_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SignalsConfig {
    pub normalization: NormalizationConfig,
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub technical: TechnicalConfig,
    #[serde(default)]
    pub value: ValueConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    pub flow: FlowConfig,
    pub event: EventConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DrawdownConfig {
    pub max_drawdown_1d: Decimal,
    pub max_drawdown_5d: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OverheatConfig {
    pub enabled: bool,
    pub max_return_5d: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FundamentalsConfig {
    pub min_momentum: Decimal,
    pub min_technical: Decimal,
    pub min_flow: Decimal,
    pub max_per: Decimal,
    pub max_pbr: Decimal,
    pub min_roe: Decimal,
    pub exclude_negative_earnings: bool,
    pub max_debt_ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VolatilityConfig {
    pub enabled: bool,
    /// Fraction (e.g. `0.1` for top-10%) of highest-`Volatility20D`
    /// survivors excluded in Phase 2.
    pub max_vol_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScreeningConfig {
    pub fundamentals: FundamentalsConfig,
    pub drawdown: DrawdownConfig,
    pub overheat: OverheatConfig,
    pub volatility: VolatilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RankingWeights {
    pub momentum: Decimal,
    pub technical: Decimal,
    pub value: Decimal,
    pub quality: Decimal,
    pub flow: Decimal,
    pub event: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RankingConstraints {
    pub weight_sum_tolerance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Weights in percent; must sum to 100.
    pub weights_pct: RankingWeights,
    pub constraints: RankingConstraints,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HoldingsConfig {
    pub min: u32,
    pub max: u32,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Tier {
    pub count: u32,
    pub weight_each: Decimal,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingMode {
    Tiered,
    Equal,
    ScoreWeighted,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeightingConfig {
    pub mode: WeightingMode,
    #[serde(default)]
    pub tiers: Vec<Tier>,
    pub cash_target: Decimal,
    pub min_weight: Decimal,
    pub max_weight: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AllocationConfig {
    pub sector_cap: Decimal,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LiquidityCapsConfig {
    pub max_order_to_adtv20_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PortfolioConfig {
    pub holdings: HoldingsConfig,
    pub allocation: AllocationConfig,
    pub weighting: WeightingConfig,
    pub liquidity_caps: LiquidityCapsConfig,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    Market,
    MidpointBps(i32),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SplittingConfig {
    pub enabled: bool,
    pub trigger_notional: i64,
    pub min_slices: u32,
    pub max_slices: u32,
    pub interval_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlippageBucket {
    pub adtv20_floor: i64,
    pub bps: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlippageModelConfig {
    /// Sorted ascending by `adtv20_floor`; the matching bucket is the last
    /// one whose floor the order's ADTV20 meets or exceeds.
    pub buckets: Vec<SlippageBucket>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecutionConfig {
    pub limit_policy: LimitPolicy,
    pub splitting: SplittingConfig,
    pub slippage_model: SlippageModelConfig,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitMode {
    Fixed,
    Atr,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FixedExitConfig {
    pub first_stop_pct: Decimal,
    pub first_stop_frac: Decimal,
    pub second_stop_pct: Decimal,
    pub hard_stop_pct: Decimal,
    pub floor_buffer: Decimal,
    pub trail_dist: Decimal,
    pub tp1_pct: Decimal,
    pub tp1_frac: Decimal,
    pub tp2_pct: Decimal,
    pub tp2_frac: Decimal,
    pub tp3_pct: Decimal,
    pub tp3_frac: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AtrExitConfig {
    pub period: u32,
    pub tp1_mult: Decimal,
    pub tp2_mult: Decimal,
    pub tp3_mult: Decimal,
    pub min_pct: Decimal,
    pub max_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExitConfig {
    pub mode: ExitMode,
    pub fixed: FixedExitConfig,
    pub atr: AtrExitConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RiskOverlayConfig {
    #[serde(default)]
    pub max_gross_exposure: Option<Decimal>,
    #[serde(default)]
    pub sector_blacklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct BacktestCostsConfig {
    #[serde(default)]
    pub commission_bps: Decimal,
    #[serde(default)]
    pub slippage_bps: Decimal,
    #[serde(default)]
    pub risk_free_rate: Decimal,
}
