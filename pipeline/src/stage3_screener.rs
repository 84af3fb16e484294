//! S3 Screener: two fixed-order phases. Phase 1 (absolute
//! fundamentals + drawdown) drops symbols outright; phase 2 (overheat +
//! volatility) operates only on phase-1 survivors and is therefore relative
//! to that smaller set. A symbol can carry at most one exclusion reason —
//! the first rule it fails, in the order below.

use chrono::NaiveDate;
use indexmap::IndexMap;
use quant_config::schema::ScreeningConfig;
use quant_core::ids::StockCode;
use quant_core::signals::StockSignals;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct DrawdownInputs {
    pub return_1d: Decimal,
    pub return_5d: Decimal,
}

#[derive(Debug, Clone)]
pub struct ScreenCandidate {
    pub signals: StockSignals,
    pub drawdown: DrawdownInputs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningResult {
    pub date: NaiveDate,
    pub survivors: Vec<StockCode>,
    pub excluded: IndexMap<StockCode, &'static str>,
}

fn fails_fundamentals(signals: &StockSignals, config: &ScreeningConfig) -> Option<&'static str> {
    let f = &config.fundamentals;
    if signals.momentum < f.min_momentum {
        return Some("momentum 미달");
    }
    if signals.technical < f.min_technical {
        return Some("technical 미달");
    }
    if signals.flow < f.min_flow {
        return Some("flow 미달");
    }
    if let Some(per) = signals.details.per {
        if per > f.max_per {
            return Some("PER 초과");
        }
    }
    if let Some(pbr) = signals.details.pbr {
        if pbr > f.max_pbr {
            return Some("PBR 초과");
        }
    }
    if let Some(roe) = signals.details.roe {
        if roe < f.min_roe {
            return Some("ROE 미달");
        }
        if f.exclude_negative_earnings && roe < Decimal::ZERO {
            return Some("적자 기업");
        }
    }
    if let Some(debt_ratio) = signals.details.debt_ratio {
        if debt_ratio > f.max_debt_ratio {
            return Some("부채비율 초과");
        }
    }
    None
}

fn fails_drawdown(drawdown: &DrawdownInputs, config: &ScreeningConfig) -> Option<&'static str> {
    if drawdown.return_1d <= -config.drawdown.max_drawdown_1d {
        return Some("1일 급락");
    }
    if drawdown.return_5d <= -config.drawdown.max_drawdown_5d {
        return Some("5일 급락");
    }
    None
}

/// Phase 1: absolute checks, evaluated independently per symbol against
/// configured thresholds only.
fn phase1(candidates: &[(StockCode, ScreenCandidate)], config: &ScreeningConfig) -> (Vec<StockCode>, IndexMap<StockCode, &'static str>) {
    let mut survivors = Vec::new();
    let mut excluded = IndexMap::new();
    for (code, candidate) in candidates {
        let reason = fails_fundamentals(&candidate.signals, config)
            .or_else(|| fails_drawdown(&candidate.drawdown, config));
        match reason {
            Some(r) => {
                excluded.insert(code.clone(), r);
            }
            None => survivors.push(code.clone()),
        }
    }
    (survivors, excluded)
}

/// Phase 2: relative checks computed over phase-1 survivors only. Overheat
/// drops symbols whose 5-day return exceeds the configured ceiling;
/// volatility drops the top `max_vol_pct` fraction of survivors by
/// `volatility_20d`, highest first.
fn phase2(
    survivors: Vec<StockCode>,
    candidates: &IndexMap<StockCode, ScreenCandidate>,
    config: &ScreeningConfig,
) -> (Vec<StockCode>, IndexMap<StockCode, &'static str>) {
    let mut excluded = IndexMap::new();
    let mut remaining: Vec<StockCode> = if config.overheat.enabled {
        let (kept, over) = survivors.into_iter().partition::<Vec<_>, _>(|code| {
            let candidate = &candidates[code];
            candidate.drawdown.return_5d <= config.overheat.max_return_5d
        });
        for code in over {
            excluded.insert(code, "과열 구간");
        }
        kept
    } else {
        survivors
    };

    if config.volatility.enabled && !remaining.is_empty() {
        use rust_decimal::prelude::ToPrimitive;
        let cut = (Decimal::from(remaining.len()) * config.volatility.max_vol_pct)
            .to_usize()
            .unwrap_or(0)
            .min(remaining.len());
        if cut > 0 {
            remaining.sort_by(|a, b| {
                let va = candidates[a].signals.details.volatility_20d.unwrap_or(Decimal::ZERO);
                let vb = candidates[b].signals.details.volatility_20d.unwrap_or(Decimal::ZERO);
                vb.cmp(&va)
            });
            for code in remaining.drain(..cut) {
                excluded.insert(code, "변동성 초과");
            }
        }
    }

    (remaining, excluded)
}

pub fn compute(date: NaiveDate, candidates: Vec<(StockCode, ScreenCandidate)>, config: &ScreeningConfig) -> ScreeningResult {
    let (phase1_survivors, mut excluded) = phase1(&candidates, config);
    let by_code: IndexMap<StockCode, ScreenCandidate> = candidates.into_iter().collect();
    let (final_survivors, phase2_excluded) = phase2(phase1_survivors, &by_code, config);
    excluded.extend(phase2_excluded);

    ScreeningResult {
        date,
        survivors: final_survivors,
        excluded,
    }
}
