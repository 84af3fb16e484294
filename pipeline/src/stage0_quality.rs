//! S0 Quality Gate: per-source coverage -> weighted quality
//! score -> pass/fail.

use chrono::NaiveDate;
use indexmap::IndexMap;
use quant_config::schema::MetaConfig;
use quant_core::quality::DataQualitySnapshot;
use rust_decimal::Decimal;

/// Non-null / expected row counts for one upstream source on one date.
#[derive(Debug, Clone, Copy)]
pub struct SourceCoverage {
    pub non_null_rows: u32,
    pub expected_rows: u32,
}

impl SourceCoverage {
    fn ratio(self) -> Decimal {
        if self.expected_rows == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(self.non_null_rows) / Decimal::from(self.expected_rows)
        }
    }
}

#[derive(Debug, Clone)]
pub struct QualityInputs {
    pub date: NaiveDate,
    pub total_stocks: u32,
    pub valid_stocks: u32,
    pub sources: IndexMap<String, SourceCoverage>,
}

/// Computes the S0 snapshot: `quality_score` is the configured weighted
/// average of per-source coverage ratios; `passed = quality_score >=
/// threshold`.
pub fn compute(inputs: &QualityInputs, meta: &MetaConfig) -> DataQualitySnapshot {
    let coverage: IndexMap<String, Decimal> = inputs
        .sources
        .iter()
        .map(|(name, cov)| (name.clone(), cov.ratio()))
        .collect();

    let (weighted_sum, weight_total) = coverage.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(sum, total), (name, ratio)| {
            let weight = meta
                .source_weights
                .get(name)
                .copied()
                .unwrap_or(Decimal::ZERO);
            (sum + weight * ratio, total + weight)
        },
    );

    let quality_score = if weight_total.is_zero() {
        Decimal::ZERO
    } else {
        weighted_sum / weight_total
    };

    let passed = quality_score >= meta.quality_threshold;

    DataQualitySnapshot {
        date: inputs.date,
        total_stocks: inputs.total_stocks,
        valid_stocks: inputs.valid_stocks,
        coverage,
        quality_score,
        passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn meta() -> MetaConfig {
        let mut weights = BTreeMap::new();
        weights.insert("kis".to_string(), dec!(0.5));
        weights.insert("dart".to_string(), dec!(0.3));
        weights.insert("naver".to_string(), dec!(0.2));
        MetaConfig {
            strategy_id: "test".to_string(),
            capital: 1,
            quality_threshold: dec!(0.9),
            source_weights: weights,
        }
    }

    #[test]
    fn full_coverage_passes() {
        let mut sources = IndexMap::new();
        sources.insert(
            "kis".to_string(),
            SourceCoverage {
                non_null_rows: 100,
                expected_rows: 100,
            },
        );
        sources.insert(
            "dart".to_string(),
            SourceCoverage {
                non_null_rows: 100,
                expected_rows: 100,
            },
        );
        sources.insert(
            "naver".to_string(),
            SourceCoverage {
                non_null_rows: 100,
                expected_rows: 100,
            },
        );
        let inputs = QualityInputs {
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            total_stocks: 2000,
            valid_stocks: 1990,
            sources,
        };
        let snapshot = compute(&inputs, &meta());
        assert_eq!(snapshot.quality_score, Decimal::ONE);
        assert!(snapshot.passed);
        assert!(snapshot.is_valid());
    }

    #[test]
    fn poor_source_coverage_fails_threshold() {
        let mut sources = IndexMap::new();
        sources.insert(
            "kis".to_string(),
            SourceCoverage {
                non_null_rows: 50,
                expected_rows: 100,
            },
        );
        sources.insert(
            "dart".to_string(),
            SourceCoverage {
                non_null_rows: 100,
                expected_rows: 100,
            },
        );
        sources.insert(
            "naver".to_string(),
            SourceCoverage {
                non_null_rows: 100,
                expected_rows: 100,
            },
        );
        let inputs = QualityInputs {
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            total_stocks: 2000,
            valid_stocks: 1000,
            sources,
        };
        let snapshot = compute(&inputs, &meta());
        // weighted: 0.5*0.5 + 0.3*1.0 + 0.2*1.0 = 0.25 + 0.3 + 0.2 = 0.75
        assert_eq!(snapshot.quality_score, dec!(0.75));
        assert!(!snapshot.passed);
    }
}
