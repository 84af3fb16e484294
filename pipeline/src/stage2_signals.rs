//! S2 Signal Builder: six raw factor features per symbol,
//! each run through the shared normalization pipeline.

use crate::normalization::normalize_factor;
use chrono::NaiveDate;
use indexmap::IndexMap;
use quant_config::schema::SignalsConfig;
use quant_core::ids::StockCode;
use quant_core::signals::{EventTag, SignalSet, StockSignalDetails, StockSignals};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct FlowInputs {
    /// actor ("foreign" | "institution" | "individual") -> horizon (days)
    /// -> net flow.
    pub actor_horizon_net: BTreeMap<String, BTreeMap<u32, Decimal>>,
    pub turnover: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct DisclosureInput {
    pub report_type: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct RawSymbolInputs {
    pub code: StockCode,
    /// horizon (trading days) -> return over that horizon.
    pub momentum_returns: BTreeMap<u32, Decimal>,
    pub technical_raw: Option<Decimal>,
    pub per: Option<Decimal>,
    pub pbr: Option<Decimal>,
    pub roe: Option<Decimal>,
    pub debt_ratio: Option<Decimal>,
    pub return_1d: Option<Decimal>,
    pub return_5d: Option<Decimal>,
    pub volatility_20d: Option<Decimal>,
    pub flow: FlowInputs,
    pub disclosures: Vec<DisclosureInput>,
}

fn raw_momentum(inputs: &RawSymbolInputs, config: &SignalsConfig) -> Option<Decimal> {
    if inputs.momentum_returns.is_empty() {
        return None;
    }
    let mut sum = Decimal::ZERO;
    let mut matched_weight = Decimal::ZERO;
    for (horizon, weight) in &config.momentum.lookback_weights {
        if let Some(ret) = inputs.momentum_returns.get(horizon) {
            sum += ret * weight;
            matched_weight += weight;
        }
    }
    if matched_weight.is_zero() {
        None
    } else {
        Some(sum)
    }
}

fn raw_value(inputs: &RawSymbolInputs, config: &SignalsConfig) -> Option<Decimal> {
    match (inputs.per, inputs.pbr) {
        (None, None) => None,
        (per, pbr) => {
            let per = per.unwrap_or(Decimal::ZERO);
            let pbr = pbr.unwrap_or(Decimal::ZERO);
            // Lower PER/PBR is better value; negate so higher raw == better.
            Some(-(per * config.value.per_weight + pbr * config.value.pbr_weight))
        }
    }
}

fn raw_quality(inputs: &RawSymbolInputs, config: &SignalsConfig) -> Option<Decimal> {
    match (inputs.roe, inputs.debt_ratio) {
        (None, None) => None,
        (roe, debt_ratio) => {
            let roe = roe.unwrap_or(Decimal::ZERO);
            let debt_ratio = debt_ratio.unwrap_or(Decimal::ZERO);
            Some(roe * config.quality.roe_weight - debt_ratio * config.quality.debt_ratio_weight)
        }
    }
}

fn raw_flow(inputs: &RawSymbolInputs, config: &SignalsConfig) -> Option<Decimal> {
    if inputs.flow.actor_horizon_net.is_empty() {
        return None;
    }
    let mut sum = Decimal::ZERO;
    for (actor, horizon_weights) in &config.flow.actor_horizon_weights {
        if let Some(actor_flows) = inputs.flow.actor_horizon_net.get(actor) {
            for (horizon, weight) in horizon_weights {
                if let Some(net) = actor_flows.get(horizon) {
                    sum += net * weight;
                }
            }
        }
    }
    if config.flow.normalize_by_turnover {
        match inputs.flow.turnover {
            Some(turnover) if !turnover.is_zero() => Some(sum / turnover),
            _ => Some(Decimal::ZERO),
        }
    } else {
        Some(sum)
    }
}

/// Linear decay from `1.0` on the disclosure date to `0.0` once `ttl_days`
/// have elapsed.
fn event_decay(age_days: i64, ttl_days: u32) -> Decimal {
    if ttl_days == 0 || age_days < 0 {
        return Decimal::ZERO;
    }
    let fraction = Decimal::ONE - Decimal::from(age_days) / Decimal::from(ttl_days);
    fraction.clamp(Decimal::ZERO, Decimal::ONE)
}

fn event_tags(inputs: &RawSymbolInputs, date: NaiveDate, config: &SignalsConfig) -> Vec<EventTag> {
    inputs
        .disclosures
        .iter()
        .filter(|d| {
            config.event.tracked_report_types.is_empty()
                || config
                    .event
                    .tracked_report_types
                    .iter()
                    .any(|t| t == &d.report_type)
        })
        .map(|d| {
            let age_days = (date - d.date).num_days();
            EventTag {
                event_type: d.report_type.clone(),
                date: d.date,
                decay: event_decay(age_days, config.event.ttl_days),
            }
        })
        .filter(|tag| tag.decay > Decimal::ZERO)
        .collect()
}

fn raw_event(tags: &[EventTag]) -> Option<Decimal> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.iter().map(|t| t.decay).sum())
    }
}

pub fn compute(date: NaiveDate, symbols: &[RawSymbolInputs], config: &SignalsConfig) -> SignalSet {
    let momentum_raw: Vec<_> = symbols
        .iter()
        .map(|s| (s.code.clone(), raw_momentum(s, config)))
        .collect();
    let technical_raw: Vec<_> = symbols
        .iter()
        .map(|s| (s.code.clone(), s.technical_raw))
        .collect();
    let value_raw: Vec<_> = symbols
        .iter()
        .map(|s| (s.code.clone(), raw_value(s, config)))
        .collect();
    let quality_raw: Vec<_> = symbols
        .iter()
        .map(|s| (s.code.clone(), raw_quality(s, config)))
        .collect();
    let flow_raw: Vec<_> = symbols
        .iter()
        .map(|s| (s.code.clone(), raw_flow(s, config)))
        .collect();
    let event_tags_by_code: IndexMap<StockCode, Vec<EventTag>> = symbols
        .iter()
        .map(|s| (s.code.clone(), event_tags(s, date, config)))
        .collect();
    let event_raw: Vec<_> = symbols
        .iter()
        .map(|s| {
            (
                s.code.clone(),
                raw_event(event_tags_by_code.get(&s.code).unwrap()),
            )
        })
        .collect();

    let momentum_scores = normalize_factor(&momentum_raw, &config.normalization);
    let technical_scores = normalize_factor(&technical_raw, &config.normalization);
    let value_scores = normalize_factor(&value_raw, &config.normalization);
    let quality_scores = normalize_factor(&quality_raw, &config.normalization);
    let flow_scores = normalize_factor(&flow_raw, &config.normalization);
    let event_scores = normalize_factor(&event_raw, &config.normalization);

    let lookup = |scores: &[(StockCode, Decimal)], code: &StockCode| -> Decimal {
        scores
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, v)| *v)
            .unwrap_or(config.normalization.neutral_value)
    };

    let mut signals = IndexMap::new();
    for s in symbols {
        let stock_signals = StockSignals {
            code: s.code.clone(),
            momentum: lookup(&momentum_scores, &s.code),
            technical: lookup(&technical_scores, &s.code),
            value: lookup(&value_scores, &s.code),
            quality: lookup(&quality_scores, &s.code),
            flow: lookup(&flow_scores, &s.code),
            event: lookup(&event_scores, &s.code),
            details: StockSignalDetails {
                per: s.per,
                pbr: s.pbr,
                roe: s.roe,
                debt_ratio: s.debt_ratio,
                return_1d: s.return_1d,
                return_5d: s.return_5d,
                volatility_20d: s.volatility_20d,
                events: event_tags_by_code.get(&s.code).cloned().unwrap_or_default(),
            },
        };
        signals.insert(s.code.clone(), stock_signals);
    }

    SignalSet { date, signals }
}
