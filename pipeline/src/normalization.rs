//! Shared factor-normalization pipeline: winsorize at the
//! configured percentile tails, z-score within the universe, clip to
//! `[-zscore_clip, +zscore_clip]`, then linearly map to `[score_min,
//! score_max]`. A missing raw value maps to the configured neutral value
//! without going through the pipeline at all.

use quant_config::schema::NormalizationConfig;
use quant_core::ids::StockCode;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

fn winsorize(mut values: Vec<Decimal>, pct: Decimal) -> Vec<Decimal> {
    if values.is_empty() {
        return values;
    }
    values.sort();
    let n = values.len();
    let cut = (Decimal::from(n) * pct)
        .to_usize()
        .unwrap_or(0)
        .min((n - 1) / 2);
    if cut == 0 {
        return values;
    }
    let lower = values[cut];
    let upper = values[n - 1 - cut];
    values
        .into_iter()
        .map(|v| v.clamp(lower, upper))
        .collect()
}

fn mean_and_stddev(values: &[Decimal]) -> (Decimal, Decimal) {
    let n = Decimal::from(values.len());
    let mean = values.iter().copied().sum::<Decimal>() / n;
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / n;
    let stddev = variance.sqrt().unwrap_or(Decimal::ZERO);
    (mean, stddev)
}

/// Normalizes one factor's raw values across the universe for a single
/// date. `raw` carries `None` for symbols with a missing input; those
/// receive `config.neutral_value` directly, untouched by winsorization or
/// z-scoring (a missing input should not skew the distribution other
/// symbols are scored against).
pub fn normalize_factor(
    raw: &[(StockCode, Option<Decimal>)],
    config: &NormalizationConfig,
) -> Vec<(StockCode, Decimal)> {
    let present: Vec<Decimal> = raw.iter().filter_map(|(_, v)| *v).collect();
    let winsorized = winsorize(present, config.winsorize_pct);
    let (mean, stddev) = mean_and_stddev(&winsorized);

    // Winsorization preserves order and length, so re-pairing by sorted
    // position would be wrong; instead clip each original value to the same
    // [lower, upper] bound independently derived from the winsorized set's
    // min/max (equivalent effect, order-independent).
    let (lower, upper) = match (winsorized.first(), winsorized.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    raw.iter()
        .map(|(code, value)| {
            let score = match value {
                None => config.neutral_value,
                Some(v) => {
                    let clamped = v.clamp(&lower, &upper);
                    let z = if stddev.is_zero() {
                        Decimal::ZERO
                    } else {
                        (clamped - mean) / stddev
                    };
                    let clipped = z.clamp(-config.zscore_clip, config.zscore_clip);
                    let span = config.zscore_clip * Decimal::TWO;
                    let fraction = if span.is_zero() {
                        Decimal::new(5, 1)
                    } else {
                        (clipped + config.zscore_clip) / span
                    };
                    config.score_min + fraction * (config.score_max - config.score_min)
                }
            };
            (code.clone(), score)
        })
        .collect()
}
