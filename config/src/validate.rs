//! Config-level invariant checks, run once at load time so a malformed
//! config never reaches the pipeline: `InvalidConfig` is fatal before the
//! first stage runs.

use crate::schema::{StrategyConfig, WeightingMode};
use quant_core::money::validate_weights;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn validate_config(config: &StrategyConfig) -> Result<(), String> {
    validate_momentum_weights(config)?;
    validate_ranking_weights(config)?;
    validate_holdings(config)?;
    validate_weighting(config)?;
    Ok(())
}

fn validate_momentum_weights(config: &StrategyConfig) -> Result<(), String> {
    let weights = config
        .signals
        .momentum
        .lookback_weights
        .values()
        .copied();
    validate_weights(weights, Decimal::ONE, dec!(0.000001))
        .map(|_| ())
        .map_err(|e| format!("signals.momentum.lookback_weights must sum to 1.0: {e}"))
}

fn validate_ranking_weights(config: &StrategyConfig) -> Result<(), String> {
    let w = &config.ranking.weights_pct;
    let weights = [w.momentum, w.technical, w.value, w.quality, w.flow, w.event];
    validate_weights(weights, dec!(100), config.ranking.constraints.weight_sum_tolerance * dec!(100))
        .map(|_| ())
        .map_err(|e| format!("ranking.weights_pct must sum to 100: {e}"))
}

fn validate_holdings(config: &StrategyConfig) -> Result<(), String> {
    let h = &config.portfolio.holdings;
    if h.min > h.target || h.target > h.max {
        return Err(format!(
            "portfolio.holdings must satisfy min <= target <= max, got min={}, target={}, max={}",
            h.min, h.target, h.max
        ));
    }
    Ok(())
}

fn validate_weighting(config: &StrategyConfig) -> Result<(), String> {
    let weighting = &config.portfolio.weighting;
    if weighting.mode == WeightingMode::Tiered {
        let tiered_total: Decimal = weighting
            .tiers
            .iter()
            .map(|t| Decimal::from(t.count) * t.weight_each)
            .sum();
        let expected = Decimal::ONE - weighting.cash_target;
        if tiered_total > expected + dec!(0.000001) {
            return Err(format!(
                "portfolio.weighting tiers sum to {tiered_total}, which exceeds 1 - cash_target ({expected})"
            ));
        }
        let tiered_count: u32 = weighting.tiers.iter().map(|t| t.count).sum();
        if tiered_count > config.portfolio.holdings.max {
            return Err(format!(
                "portfolio.weighting tiers cover {tiered_count} positions, exceeding holdings.max ({})",
                config.portfolio.holdings.max
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_bytes;

    #[test]
    fn sample_config_validates() {
        let bytes = include_str!("../testdata/sample_config.yaml");
        let loaded = load_config_bytes(bytes.as_bytes()).unwrap();
        assert!(validate_config(&loaded.parsed).is_ok());
    }

    #[test]
    fn rejects_ranking_weights_not_summing_to_100() {
        let bytes = include_str!("../testdata/sample_config.yaml");
        let mut config = load_config_bytes(bytes.as_bytes()).unwrap().parsed;
        config.ranking.weights_pct.momentum += dec!(50);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_holdings_target_out_of_bounds() {
        let bytes = include_str!("../testdata/sample_config.yaml");
        let mut config = load_config_bytes(bytes.as_bytes()).unwrap().parsed;
        config.portfolio.holdings.target = config.portfolio.holdings.max + 1;
        assert!(validate_config(&config).is_err());
    }
}
