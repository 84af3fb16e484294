//! S6 Execution Planner: diffs target quantities against
//! current holdings into child orders, applies the liquidity cap, splits
//! large orders into slices, and prices each slice per the configured limit
//! policy and slippage model. A single symbol's failure (missing price,
//! zero ADTV20) marks that order `PLAN_FAILED` without aborting the rest of
//! the plan.

use chrono::{DateTime, NaiveDate, Utc};
use quant_config::schema::{ExecutionConfig, LimitPolicy};
use quant_core::execution::{ExecutionPlan, Order, OrderStatus, Side};
use quant_core::ids::StockCode;
use quant_core::money::Won;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct ExecutionInput {
    pub code: StockCode,
    pub target_qty: u64,
    pub current_qty: u64,
    pub adtv20: Won,
    pub mid_price: Won,
}

fn side_and_qty(input: &ExecutionInput) -> Option<(Side, u64)> {
    if input.target_qty > input.current_qty {
        Some((Side::Buy, input.target_qty - input.current_qty))
    } else if input.target_qty < input.current_qty {
        Some((Side::Sell, input.current_qty - input.target_qty))
    } else {
        None
    }
}

fn apply_liquidity_cap(qty: u64, input: &ExecutionInput, max_order_to_adtv20_pct: Decimal) -> u64 {
    if input.mid_price.0 <= 0 || input.adtv20.0 <= 0 {
        return qty;
    }
    let max_notional = (Decimal::from(input.adtv20.0) * max_order_to_adtv20_pct)
        .to_i64()
        .unwrap_or(i64::MAX);
    let max_qty = (max_notional / input.mid_price.0).max(0) as u64;
    qty.min(max_qty.max(1))
}

fn slice_count(notional: i64, config: &ExecutionConfig) -> u32 {
    if !config.splitting.enabled || notional < config.splitting.trigger_notional {
        return 1;
    }
    let ratio = notional / config.splitting.trigger_notional.max(1);
    (ratio as u32).clamp(config.splitting.min_slices, config.splitting.max_slices)
}

fn limit_price(mid_price: Won, side: Side, policy: &LimitPolicy) -> Won {
    match policy {
        LimitPolicy::Market => Won::ZERO,
        LimitPolicy::MidpointBps(bps) => {
            let adj = Decimal::from(*bps) / Decimal::from(10_000);
            let factor = match side {
                Side::Buy => Decimal::ONE + adj,
                Side::Sell => Decimal::ONE - adj,
            };
            mid_price.checked_mul_ratio(factor).unwrap_or(mid_price)
        }
    }
}

fn estimated_slippage_bps(adtv20: Won, config: &ExecutionConfig) -> Option<i32> {
    config
        .slippage_model
        .buckets
        .iter()
        .filter(|bucket| adtv20.0 >= bucket.adtv20_floor)
        .max_by_key(|bucket| bucket.adtv20_floor)
        .map(|bucket| bucket.bps)
}

fn build_orders(
    parent_id: &str,
    input: &ExecutionInput,
    side: Side,
    qty: u64,
    config: &ExecutionConfig,
    created_at: DateTime<Utc>,
) -> Vec<Order> {
    let notional = (input.mid_price.0).saturating_mul(qty as i64);
    let slices = slice_count(notional, config);
    let per_slice = qty / slices as u64;
    let remainder = qty % slices as u64;
    let slippage = estimated_slippage_bps(input.adtv20, config);

    (0..slices)
        .filter_map(|i| {
            let slice_qty = per_slice + if i == 0 { remainder } else { 0 };
            if slice_qty == 0 {
                return None;
            }
            Some(Order {
                id: format!("{parent_id}-{}-{i}", input.code),
                code: input.code.clone(),
                side,
                qty: slice_qty,
                price: limit_price(input.mid_price, side, &config.limit_policy),
                slice_of: if slices > 1 { Some(parent_id.to_string()) } else { None },
                status: OrderStatus::Planned,
                estimated_slippage_bps: slippage,
                created_at,
            })
        })
        .collect()
}

pub fn compute(
    plan_id: &str,
    date: NaiveDate,
    inputs: &[ExecutionInput],
    max_order_to_adtv20_pct: Decimal,
    config: &ExecutionConfig,
    created_at: DateTime<Utc>,
) -> ExecutionPlan {
    let mut orders = Vec::new();
    for input in inputs {
        let Some((side, raw_qty)) = side_and_qty(input) else {
            continue;
        };
        if input.mid_price.0 <= 0 {
            orders.push(Order {
                id: format!("{plan_id}-{}-failed", input.code),
                code: input.code.clone(),
                side,
                qty: raw_qty,
                price: Won::ZERO,
                slice_of: None,
                status: OrderStatus::PlanFailed,
                estimated_slippage_bps: None,
                created_at,
            });
            continue;
        }
        let capped_qty = apply_liquidity_cap(raw_qty, input, max_order_to_adtv20_pct);
        orders.extend(build_orders(plan_id, input, side, capped_qty, config, created_at));
    }

    ExecutionPlan {
        id: plan_id.to_string(),
        date,
        orders,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_config::schema::{SlippageBucket, SlippageModelConfig, SplittingConfig};
    use rust_decimal_macros::dec;

    fn config() -> ExecutionConfig {
        ExecutionConfig {
            limit_policy: LimitPolicy::MidpointBps(10),
            splitting: SplittingConfig {
                enabled: true,
                trigger_notional: 100_000_000,
                min_slices: 2,
                max_slices: 5,
                interval_seconds: 60,
            },
            slippage_model: SlippageModelConfig {
                buckets: vec![
                    SlippageBucket { adtv20_floor: 0, bps: 50 },
                    SlippageBucket { adtv20_floor: 1_000_000_000, bps: 20 },
                ],
            },
        }
    }

    fn input(code: &str, target: u64, current: u64) -> ExecutionInput {
        ExecutionInput {
            code: StockCode::from(code),
            target_qty: target,
            current_qty: current,
            adtv20: Won(10_000_000_000),
            mid_price: Won(10_000),
        }
    }

    #[test]
    fn unchanged_position_produces_no_order() {
        let plan = compute(
            "p1",
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            &[input("A", 100, 100)],
            dec!(0.1),
            &config(),
            Utc::now(),
        );
        assert!(plan.orders.is_empty());
    }

    #[test]
    fn zero_price_marks_plan_failed_without_aborting_others() {
        let mut bad = input("A", 100, 0);
        bad.mid_price = Won(0);
        let good = input("B", 50, 0);
        let plan = compute(
            "p1",
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            &[bad, good],
            dec!(0.1),
            &config(),
            Utc::now(),
        );
        let failed = plan.orders.iter().find(|o| o.code == StockCode::from("A")).unwrap();
        assert_eq!(failed.status, OrderStatus::PlanFailed);
        assert!(plan.orders.iter().any(|o| o.code == StockCode::from("B") && o.status == OrderStatus::Planned));
    }

    #[test]
    fn large_order_splits_into_slices() {
        let big = input("A", 200_000, 0); // notional = 200_000 * 10_000 = 2_000_000_000
        let plan = compute(
            "p1",
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            &[big],
            dec!(1.0),
            &config(),
            Utc::now(),
        );
        assert!(plan.orders.len() > 1);
        let total_qty: u64 = plan.orders.iter().map(|o| o.qty).sum();
        assert!(total_qty <= 200_000);
    }
}
