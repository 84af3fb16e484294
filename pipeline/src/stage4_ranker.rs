//! S4 Ranker: weighted sum of the six factor scores,
//! descending sort, ties broken by ascending stock code, 1-based rank
//! assignment.

use quant_config::schema::RankingWeights;
#[cfg(test)]
use quant_core::ids::StockCode;
use quant_core::ranking::{RankedStock, ScoreDetail};
use quant_core::signals::StockSignals;
use rust_decimal::Decimal;

fn weighted_score(signals: &StockSignals, weights: &RankingWeights) -> Decimal {
    signals.momentum * weights.momentum
        + signals.technical * weights.technical
        + signals.value * weights.value
        + signals.quality * weights.quality
        + signals.flow * weights.flow
        + signals.event * weights.event
}

pub fn compute(survivors: &[StockSignals], weights_pct: &RankingWeights) -> Vec<RankedStock> {
    // weights_pct values are in percent and sum to 100; divide by 100 so the
    // weighted sum stays on the same 0-100 scale as each factor score.
    let hundred = Decimal::from(100);
    let weights = RankingWeights {
        momentum: weights_pct.momentum / hundred,
        technical: weights_pct.technical / hundred,
        value: weights_pct.value / hundred,
        quality: weights_pct.quality / hundred,
        flow: weights_pct.flow / hundred,
        event: weights_pct.event / hundred,
    };

    let mut scored: Vec<(Decimal, &StockSignals)> = survivors
        .iter()
        .map(|s| (weighted_score(s, &weights), s))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then_with(|| a.code.as_str().cmp(b.code.as_str()))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (total_score, s))| RankedStock {
            code: s.code.clone(),
            rank: idx as u32 + 1,
            total_score,
            scores: ScoreDetail {
                momentum: s.momentum,
                technical: s.technical,
                value: s.value,
                quality: s.quality,
                flow: s.flow,
                event: s.event,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::signals::StockSignalDetails;
    use rust_decimal_macros::dec;

    fn weights() -> RankingWeights {
        RankingWeights {
            momentum: dec!(25),
            technical: dec!(15),
            value: dec!(20),
            quality: dec!(15),
            flow: dec!(15),
            event: dec!(10),
        }
    }

    fn signals(code: &str, momentum: Decimal) -> StockSignals {
        StockSignals {
            code: StockCode::from(code),
            momentum,
            technical: dec!(50),
            value: dec!(50),
            quality: dec!(50),
            flow: dec!(50),
            event: dec!(50),
            details: StockSignalDetails::default(),
        }
    }

    #[test]
    fn empty_input_produces_empty_output() {
        assert!(compute(&[], &weights()).is_empty());
    }

    #[test]
    fn descending_sort_by_total_score() {
        let survivors = vec![signals("A", dec!(60)), signals("B", dec!(80))];
        let ranked = compute(&survivors, &weights());
        assert_eq!(ranked[0].code, StockCode::from("B"));
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].code, StockCode::from("A"));
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn ties_break_by_ascending_code() {
        let survivors = vec![signals("Z001", dec!(50)), signals("A001", dec!(50))];
        let ranked = compute(&survivors, &weights());
        assert_eq!(ranked[0].code, StockCode::from("A001"));
        assert_eq!(ranked[1].code, StockCode::from("Z001"));
    }
}
