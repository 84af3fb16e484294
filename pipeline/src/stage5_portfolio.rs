//! S5 Portfolio Constructor: turns the ranked list into
//! target weights, then diffs those weights against current holdings to
//! produce BUY/SELL/HOLD actions. Constraints apply in a fixed order:
//! per-position clamp, then sector cap, then blacklist removal, then
//! re-normalization so weights plus cash sum to 1.0.

use chrono::NaiveDate;
use quant_config::schema::{PortfolioConfig, WeightingMode};
use quant_core::ids::StockCode;
use quant_core::money::Won;
use quant_core::portfolio::{Action, TargetPortfolio, TargetPosition};
use quant_core::ranking::RankedStock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CandidateMeta {
    pub code: StockCode,
    pub name: String,
    pub sector: String,
    pub price: Won,
}

#[derive(Debug, Clone, Copy)]
pub struct CurrentHolding {
    pub quantity: u64,
}

fn select_holdings(ranked: &[RankedStock], target: u32) -> Vec<&RankedStock> {
    ranked.iter().take(target as usize).collect()
}

fn tiered_weights(selected: &[&RankedStock], config: &PortfolioConfig) -> BTreeMap<StockCode, Decimal> {
    let mut weights = BTreeMap::new();
    let mut iter = selected.iter();
    for tier in &config.weighting.tiers {
        for _ in 0..tier.count {
            if let Some(stock) = iter.next() {
                weights.insert(stock.code.clone(), tier.weight_each);
            }
        }
    }
    // Any selected stock beyond the configured tiers gets no allocation.
    weights
}

fn equal_weights(selected: &[&RankedStock], config: &PortfolioConfig) -> BTreeMap<StockCode, Decimal> {
    if selected.is_empty() {
        return BTreeMap::new();
    }
    let investable = Decimal::ONE - config.weighting.cash_target;
    let each = investable / Decimal::from(selected.len());
    selected.iter().map(|s| (s.code.clone(), each)).collect()
}

fn score_weighted_weights(selected: &[&RankedStock], config: &PortfolioConfig) -> BTreeMap<StockCode, Decimal> {
    let total_score: Decimal = selected.iter().map(|s| s.total_score.max(Decimal::ZERO)).sum();
    if total_score.is_zero() {
        return equal_weights(selected, config);
    }
    let investable = Decimal::ONE - config.weighting.cash_target;
    selected
        .iter()
        .map(|s| {
            let fraction = s.total_score.max(Decimal::ZERO) / total_score;
            (s.code.clone(), investable * fraction)
        })
        .collect()
}

fn raw_weights(selected: &[&RankedStock], config: &PortfolioConfig) -> BTreeMap<StockCode, Decimal> {
    match config.weighting.mode {
        WeightingMode::Tiered => tiered_weights(selected, config),
        WeightingMode::Equal => equal_weights(selected, config),
        WeightingMode::ScoreWeighted => score_weighted_weights(selected, config),
    }
}

fn clamp_per_position(weights: &mut BTreeMap<StockCode, Decimal>, config: &PortfolioConfig) {
    for weight in weights.values_mut() {
        *weight = (*weight).clamp(config.weighting.min_weight, config.weighting.max_weight);
    }
}

fn apply_sector_cap(
    weights: &mut BTreeMap<StockCode, Decimal>,
    meta: &BTreeMap<StockCode, CandidateMeta>,
    cap: Decimal,
) {
    let mut by_sector: BTreeMap<String, Vec<StockCode>> = BTreeMap::new();
    for (code, m) in meta {
        if weights.contains_key(code) {
            by_sector.entry(m.sector.clone()).or_default().push(code.clone());
        }
    }
    for codes in by_sector.values() {
        let sector_total: Decimal = codes.iter().map(|c| weights[c]).sum();
        if sector_total > cap && !sector_total.is_zero() {
            let scale = cap / sector_total;
            for code in codes {
                if let Some(w) = weights.get_mut(code) {
                    *w *= scale;
                }
            }
        }
    }
}

fn apply_blacklist(weights: &mut BTreeMap<StockCode, Decimal>, blacklist: &[String]) {
    weights.retain(|code, _| !blacklist.iter().any(|b| b == code.as_str()));
}

/// Scales weights down to fit `1 - cash_target` when they overflow it. If
/// fewer than `min_positions` survived the earlier constraint stages, the
/// shortfall is left unfilled and parked in cash rather than stretched
/// across too few names to hit the target allocation, and a warning is
/// emitted so the gap is visible.
fn renormalize(weights: &mut BTreeMap<StockCode, Decimal>, cash_target: Decimal, min_positions: u32) {
    if weights.len() < min_positions as usize {
        tracing::warn!(
            position_count = weights.len(),
            min_positions,
            "fewer than the minimum position count survived constraints; parking unallocated weight in cash"
        );
        return;
    }
    let total: Decimal = weights.values().copied().sum();
    let target_total = Decimal::ONE - cash_target;
    if total.is_zero() || total <= target_total {
        return;
    }
    let scale = target_total / total;
    for weight in weights.values_mut() {
        *weight *= scale;
    }
}

/// HOLD unless the target weight differs from the current weight by at
/// least 2 percentage points; otherwise BUY/SELL toward the delta.
fn action_for(weight_delta: Decimal) -> Action {
    let threshold = Decimal::new(2, 2); // 0.02
    if weight_delta.abs() < threshold {
        Action::Hold
    } else if weight_delta > Decimal::ZERO {
        Action::Buy
    } else {
        Action::Sell
    }
}

pub fn compute(
    date: NaiveDate,
    ranked: &[RankedStock],
    meta: &BTreeMap<StockCode, CandidateMeta>,
    current: &BTreeMap<StockCode, CurrentHolding>,
    capital: Won,
    config: &PortfolioConfig,
) -> TargetPortfolio {
    let selected = select_holdings(ranked, config.holdings.target);
    let mut weights = raw_weights(&selected, config);

    clamp_per_position(&mut weights, config);
    apply_sector_cap(&mut weights, meta, config.allocation.sector_cap);
    apply_blacklist(&mut weights, &config.allocation.blacklist);
    renormalize(&mut weights, config.weighting.cash_target, config.holdings.min);

    let weight_sum: Decimal = weights.values().copied().sum();
    let cash = Decimal::ONE - weight_sum;

    let mut positions: Vec<TargetPosition> = weights
        .iter()
        .filter_map(|(code, weight)| {
            let candidate = meta.get(code)?;
            let target_qty = capital
                .checked_mul_ratio(*weight)
                .and_then(|notional| {
                    if candidate.price.0 <= 0 {
                        None
                    } else {
                        Some((notional.0 / candidate.price.0).max(0) as u64)
                    }
                })
                .unwrap_or(0);
            let current_qty = current.get(code).map(|h| h.quantity).unwrap_or(0);
            let current_weight = if capital.0 > 0 {
                Decimal::from(current_qty) * Decimal::from(candidate.price.0) / Decimal::from(capital.0)
            } else {
                Decimal::ZERO
            };
            Some(TargetPosition {
                code: code.clone(),
                name: candidate.name.clone(),
                weight: *weight,
                target_qty,
                action: action_for(*weight - current_weight),
                reason: "ranked".to_string(),
            })
        })
        .collect();

    for (code, holding) in current {
        if !weights.contains_key(code) && holding.quantity > 0 {
            let name = meta.get(code).map(|m| m.name.clone()).unwrap_or_default();
            positions.push(TargetPosition {
                code: code.clone(),
                name,
                weight: Decimal::ZERO,
                target_qty: 0,
                action: Action::Sell,
                reason: "dropped from ranking".to_string(),
            });
        }
    }

    TargetPortfolio { date, positions, cash }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::ranking::ScoreDetail;
    use rust_decimal_macros::dec;

    fn ranked(code: &str, rank: u32) -> RankedStock {
        RankedStock {
            code: StockCode::from(code),
            rank,
            total_score: Decimal::from(100 - rank),
            scores: ScoreDetail::default(),
        }
    }

    fn portfolio_config() -> PortfolioConfig {
        use quant_config::schema::{AllocationConfig, HoldingsConfig, LiquidityCapsConfig, Tier, WeightingConfig};
        PortfolioConfig {
            holdings: HoldingsConfig { min: 10, max: 25, target: 20 },
            allocation: AllocationConfig { sector_cap: dec!(0.3), blacklist: vec![] },
            weighting: WeightingConfig {
                mode: WeightingMode::Tiered,
                // Self-consistent tiers: 5*0.06 + 10*0.04 + 5*0.04 = 0.90 = 1 - cash_target.
                tiers: vec![
                    Tier { count: 5, weight_each: dec!(0.06) },
                    Tier { count: 10, weight_each: dec!(0.04) },
                    Tier { count: 5, weight_each: dec!(0.04) },
                ],
                cash_target: dec!(0.10),
                min_weight: dec!(0.0),
                max_weight: dec!(0.10),
            },
            liquidity_caps: LiquidityCapsConfig { max_order_to_adtv20_pct: dec!(0.1) },
        }
    }

    #[test]
    fn tiered_allocation_sums_to_one_minus_cash_target() {
        let ranked: Vec<RankedStock> = (1..=20).map(|r| ranked(&format!("S{:03}", r), r)).collect();
        let meta: BTreeMap<StockCode, CandidateMeta> = ranked
            .iter()
            .map(|r| {
                (
                    r.code.clone(),
                    CandidateMeta {
                        code: r.code.clone(),
                        name: r.code.to_string(),
                        sector: "제조업".to_string(),
                        price: Won(10_000),
                    },
                )
            })
            .collect();
        let config = portfolio_config();
        let selected = select_holdings(&ranked, config.holdings.target);
        let weights = raw_weights(&selected, &config);
        let sum: Decimal = weights.values().copied().sum();
        assert_eq!(sum, dec!(0.90));
        let _ = meta;
    }

    #[test]
    fn sector_cap_scales_down_overweight_sector() {
        let mut weights = BTreeMap::new();
        weights.insert(StockCode::from("A"), dec!(0.2));
        weights.insert(StockCode::from("B"), dec!(0.2));
        let mut meta = BTreeMap::new();
        meta.insert(
            StockCode::from("A"),
            CandidateMeta { code: StockCode::from("A"), name: "A".into(), sector: "금융".into(), price: Won(1) },
        );
        meta.insert(
            StockCode::from("B"),
            CandidateMeta { code: StockCode::from("B"), name: "B".into(), sector: "금융".into(), price: Won(1) },
        );
        apply_sector_cap(&mut weights, &meta, dec!(0.3));
        let total: Decimal = weights.values().copied().sum();
        assert_eq!(total, dec!(0.3));
    }

    #[test]
    fn dropped_holding_is_sold() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let ranked_stocks = vec![ranked("A", 1)];
        let mut meta = BTreeMap::new();
        meta.insert(
            StockCode::from("A"),
            CandidateMeta { code: StockCode::from("A"), name: "A".into(), sector: "제조업".into(), price: Won(10_000) },
        );
        let mut current = BTreeMap::new();
        current.insert(StockCode::from("Z"), CurrentHolding { quantity: 100 });
        let config = portfolio_config();
        let portfolio = compute(date, &ranked_stocks, &meta, &current, Won(100_000_000), &config);
        let sell = portfolio.positions.iter().find(|p| p.code == StockCode::from("Z")).unwrap();
        assert_eq!(sell.action, Action::Sell);
        assert_eq!(sell.target_qty, 0);
    }

    #[test]
    fn small_weight_delta_holds_instead_of_trading() {
        assert_eq!(action_for(dec!(0.019)), Action::Hold);
        assert_eq!(action_for(dec!(-0.019)), Action::Hold);
    }

    #[test]
    fn weight_delta_at_or_above_threshold_trades() {
        assert_eq!(action_for(dec!(0.02)), Action::Buy);
        assert_eq!(action_for(dec!(-0.02)), Action::Sell);
    }

    #[test]
    fn existing_holding_within_threshold_of_its_target_is_held() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let ranked_stocks = vec![ranked("A", 1)];
        let mut meta = BTreeMap::new();
        meta.insert(
            StockCode::from("A"),
            CandidateMeta { code: StockCode::from("A"), name: "A".into(), sector: "제조업".into(), price: Won(100) },
        );
        let mut config = portfolio_config();
        config.weighting.mode = WeightingMode::Equal;
        config.holdings.target = 1;
        config.holdings.min = 1;
        // equal_weights over one stock gives 0.90, clamped by max_weight down
        // to 0.10, for a target_qty of 100 shares at capital=100,000/price=100.
        // Holding 101 shares (weight 0.101) differs by just 0.1pp, well under
        // the 2% rebalance threshold, so the old exact-quantity check would
        // have called this a SELL but it must now HOLD.
        let mut current = BTreeMap::new();
        current.insert(StockCode::from("A"), CurrentHolding { quantity: 101 });
        let portfolio = compute(date, &ranked_stocks, &meta, &current, Won(100_000), &config);
        let position = portfolio.positions.iter().find(|p| p.code == StockCode::from("A")).unwrap();
        assert_eq!(position.target_qty, 100);
        assert_eq!(position.action, Action::Hold);
    }

    #[test]
    fn below_minimum_position_count_parks_unallocated_weight_in_cash() {
        let mut weights = BTreeMap::new();
        weights.insert(StockCode::from("A"), dec!(0.5));
        renormalize(&mut weights, dec!(0.10), 5);
        // Below the 5-position minimum: renormalize must not scale the lone
        // survivor up toward the 0.90 target, leaving the gap in cash.
        assert_eq!(weights[&StockCode::from("A")], dec!(0.5));
    }

    #[test]
    fn at_or_above_minimum_position_count_still_scales_down_on_overflow() {
        let mut weights = BTreeMap::new();
        weights.insert(StockCode::from("A"), dec!(0.6));
        weights.insert(StockCode::from("B"), dec!(0.6));
        renormalize(&mut weights, dec!(0.10), 2);
        let total: Decimal = weights.values().copied().sum();
        assert_eq!(total, dec!(0.90));
    }
}
