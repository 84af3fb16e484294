//! The exit monitor's state machine: a pure step function, independent of
//! the seven-stage pipeline, evaluated against every open position on every
//! price tick.
//!
//! Checks run in a fixed precedence order — second-stop, first-stop,
//! hard-stop, floor, trailing, then the TP1/2/3 ladder — and the first one
//! that matches wins; everything downstream of it is not evaluated that
//! tick. `second_stop` is checked ahead of `first_stop` because it only
//! engages once a position has already banked profit (state >= `S1Tp1`),
//! protecting realized gains taking priority over the wider pre-profit
//! stop. The floor is a break-even-plus-buffer price,
//! `entry_price * (1 + floor_buffer)`, evaluated for any secured-profit
//! position; trailing is a peak-relative distance,
//! `high_water_mark * (1 - trail_dist)`, and only engages once a position
//! has reached the final take-profit tier (`S3Tp3`). ATR mode
//! (`ExitMode::Atr`) scales only the take-profit ladder by `atr *
//! tpN_mult`, clamped to `[min_pct, max_pct]`; stop and floor distances
//! always come from the fixed percentages since `AtrExitConfig` carries no
//! stop fields of its own.

use quant_config::schema::{ExitConfig, ExitMode};
use quant_core::money::Won;
use quant_core::position::{MonitoredPosition, PositionState};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    SecondStop,
    FirstStop,
    HardStop,
    Floor,
    Trailing,
    Tp1,
    Tp2,
    Tp3,
}

#[derive(Debug, Clone, Copy)]
pub struct ExitDecision {
    pub reason: ExitReason,
    /// Fraction of `remaining_quantity` to exit, in `(0, 1]`.
    pub exit_fraction: Decimal,
    pub new_state: PositionState,
}

fn tp_target_pct(tier: u8, config: &ExitConfig, atr: Option<Decimal>, entry: Won) -> Decimal {
    match config.mode {
        ExitMode::Fixed => match tier {
            1 => config.fixed.tp1_pct,
            2 => config.fixed.tp2_pct,
            _ => config.fixed.tp3_pct,
        },
        ExitMode::Atr => {
            let mult = match tier {
                1 => config.atr.tp1_mult,
                2 => config.atr.tp2_mult,
                _ => config.atr.tp3_mult,
            };
            let Some(atr) = atr else {
                // No ATR reading yet; fall back to the fixed ladder so the
                // monitor never silently stops protecting a position.
                return match tier {
                    1 => config.fixed.tp1_pct,
                    2 => config.fixed.tp2_pct,
                    _ => config.fixed.tp3_pct,
                };
            };
            if entry.0 == 0 {
                return Decimal::ZERO;
            }
            let distance_pct = (atr * mult) / Decimal::from(entry.0);
            distance_pct.clamp(config.atr.min_pct, config.atr.max_pct)
        }
    }
}

fn tp_frac(tier: u8, config: &ExitConfig) -> Decimal {
    match tier {
        1 => config.fixed.tp1_frac,
        2 => config.fixed.tp2_frac,
        _ => config.fixed.tp3_frac,
    }
}

/// Evaluates one price tick against one open position. Returns `None` if no
/// exit rule matches. Does not mutate `position` — call [`apply`] with the
/// result to commit the state transition.
pub fn evaluate(
    position: &MonitoredPosition,
    current_price: Won,
    config: &ExitConfig,
    atr: Option<Decimal>,
) -> Option<ExitDecision> {
    if position.state.is_terminal() {
        return None;
    }

    let pnl_pct = position.pnl_pct(current_price);
    let secured_profit = position.state >= PositionState::S1Tp1;

    if secured_profit && pnl_pct <= -config.fixed.second_stop_pct {
        return Some(ExitDecision {
            reason: ExitReason::SecondStop,
            exit_fraction: Decimal::ONE,
            new_state: PositionState::S5Closed,
        });
    }

    if position.state == PositionState::S0Open && pnl_pct <= -config.fixed.first_stop_pct {
        return Some(ExitDecision {
            reason: ExitReason::FirstStop,
            exit_fraction: config.fixed.first_stop_frac,
            new_state: PositionState::S0Open,
        });
    }

    if pnl_pct <= -config.fixed.hard_stop_pct {
        return Some(ExitDecision {
            reason: ExitReason::HardStop,
            exit_fraction: Decimal::ONE,
            new_state: PositionState::S5Closed,
        });
    }

    if secured_profit {
        let floor = position
            .entry_price
            .checked_mul_ratio(Decimal::ONE + config.fixed.floor_buffer)
            .unwrap_or(position.entry_price);
        if current_price <= floor {
            return Some(ExitDecision {
                reason: ExitReason::Floor,
                exit_fraction: Decimal::ONE,
                new_state: PositionState::S5Closed,
            });
        }
    }

    if position.state == PositionState::S3Tp3 {
        let trail = position
            .high_water_mark
            .checked_mul_ratio(Decimal::ONE - config.fixed.trail_dist)
            .unwrap_or(position.high_water_mark);
        if current_price <= trail {
            return Some(ExitDecision {
                reason: ExitReason::Trailing,
                exit_fraction: Decimal::ONE,
                new_state: PositionState::S5Closed,
            });
        }
    }

    let tiers: &[(u8, PositionState, ExitReason)] = &[
        (1, PositionState::S1Tp1, ExitReason::Tp1),
        (2, PositionState::S2Tp2, ExitReason::Tp2),
        (3, PositionState::S3Tp3, ExitReason::Tp3),
    ];
    for (tier, target_state, reason) in tiers.iter().copied() {
        if position.state >= target_state {
            continue;
        }
        let target_pct = tp_target_pct(tier, config, atr, position.entry_price);
        if pnl_pct >= target_pct {
            return Some(ExitDecision {
                reason,
                exit_fraction: tp_frac(tier, config),
                new_state: target_state,
            });
        }
    }

    None
}

/// Commits an [`ExitDecision`] against a position: reduces
/// `remaining_quantity`, advances `state`, and raises the high-water mark.
/// A position whose remaining quantity reaches zero is forced to
/// `S5Closed` regardless of the decision's nominal target state.
pub fn apply(position: &mut MonitoredPosition, decision: &ExitDecision, current_price: Won) {
    position.high_water_mark = position.high_water_mark.max(current_price);

    let exit_qty = decision
        .exit_fraction
        .checked_mul(Decimal::from(position.remaining_quantity))
        .and_then(|q| q.round_dp(0).to_u64())
        .unwrap_or(position.remaining_quantity)
        .min(position.remaining_quantity);

    position.remaining_quantity -= exit_qty;
    position.state = decision.new_state;
    if position.remaining_quantity == 0 {
        position.state = PositionState::S5Closed;
    }

    tracing::info!(
        position_id = %position.id,
        code = %position.code.as_str(),
        reason = ?decision.reason,
        exit_qty,
        remaining = position.remaining_quantity,
        new_state = ?position.state,
        "exit monitor committed decision"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quant_config::schema::{AtrExitConfig, FixedExitConfig};
    use quant_core::ids::StockCode;
    use rust_decimal_macros::dec;

    fn config() -> ExitConfig {
        ExitConfig {
            mode: ExitMode::Fixed,
            fixed: FixedExitConfig {
                first_stop_pct: dec!(0.03),
                first_stop_frac: dec!(0.5),
                second_stop_pct: dec!(0.05),
                hard_stop_pct: dec!(0.15),
                floor_buffer: dec!(0.05),
                trail_dist: dec!(0.08),
                tp1_pct: dec!(0.05),
                tp1_frac: dec!(0.3),
                tp2_pct: dec!(0.10),
                tp2_frac: dec!(0.3),
                tp3_pct: dec!(0.20),
                tp3_frac: dec!(0.4),
            },
            atr: AtrExitConfig {
                period: 14,
                tp1_mult: dec!(1.0),
                tp2_mult: dec!(2.0),
                tp3_mult: dec!(3.0),
                min_pct: dec!(0.02),
                max_pct: dec!(0.25),
            },
        }
    }

    fn position_at(state: PositionState, hwm: Won) -> MonitoredPosition {
        let mut pos = MonitoredPosition::open("p1", StockCode::from("005930"), Won(10_000), 1000, Utc::now());
        pos.state = state;
        pos.high_water_mark = hwm;
        pos
    }

    /// second_stop takes priority over floor when both would match, because
    /// it is checked first in the fixed precedence order.
    #[test]
    fn second_stop_takes_priority_over_floor() {
        let position = position_at(PositionState::S1Tp1, Won(12_000));
        let decision = evaluate(&position, Won(9_000), &config(), None).unwrap();
        assert_eq!(decision.reason, ExitReason::SecondStop);
    }

    #[test]
    fn hard_stop_fires_even_before_any_profit_secured() {
        let position = position_at(PositionState::S0Open, Won(10_000));
        let decision = evaluate(&position, Won(8_400), &config(), None).unwrap();
        assert_eq!(decision.reason, ExitReason::HardStop);
    }

    #[test]
    fn first_stop_only_applies_pre_profit() {
        let position = position_at(PositionState::S0Open, Won(10_000));
        // pnl = -4%, below first_stop_pct(3%) but above hard_stop_pct(15%).
        let decision = evaluate(&position, Won(9_600), &config(), None).unwrap();
        assert_eq!(decision.reason, ExitReason::FirstStop);
        assert_eq!(decision.exit_fraction, dec!(0.5));
    }

    #[test]
    fn tp1_triggers_partial_exit_and_advances_state() {
        let position = position_at(PositionState::S0Open, Won(10_000));
        let decision = evaluate(&position, Won(10_500), &config(), None).unwrap();
        assert_eq!(decision.reason, ExitReason::Tp1);
        assert_eq!(decision.new_state, PositionState::S1Tp1);
    }

    #[test]
    fn apply_closes_position_when_remaining_hits_zero() {
        let mut position = position_at(PositionState::S3Tp3, Won(15_000));
        position.remaining_quantity = 100;
        let decision = ExitDecision {
            reason: ExitReason::Tp3,
            exit_fraction: Decimal::ONE,
            new_state: PositionState::S3Tp3,
        };
        apply(&mut position, &decision, Won(15_000));
        assert_eq!(position.remaining_quantity, 0);
        assert_eq!(position.state, PositionState::S5Closed);
    }

    #[test]
    fn terminal_position_is_never_reevaluated() {
        let position = position_at(PositionState::S5Closed, Won(10_000));
        assert!(evaluate(&position, Won(1), &config(), None).is_none());
    }

    /// floor_buffer is 5%, so the floor sits at entry * 1.05 = 10,500,
    /// independent of how far the high-water mark has run up.
    #[test]
    fn floor_is_break_even_plus_buffer_off_entry_not_high_water_mark() {
        let position = position_at(PositionState::S1Tp1, Won(20_000));
        let decision = evaluate(&position, Won(10_400), &config(), None).unwrap();
        assert_eq!(decision.reason, ExitReason::Floor);
    }

    #[test]
    fn price_above_floor_does_not_trigger_it() {
        let position = position_at(PositionState::S1Tp1, Won(20_000));
        assert!(evaluate(&position, Won(10_600), &config(), None).is_none());
    }

    #[test]
    fn trailing_does_not_fire_before_final_take_profit_tier() {
        // hwm is far above price (an 8%+ pullback that would trip trailing
        // at S3Tp3), but this position is only at S2Tp2, so the trailing
        // check must stay gated off and fall through to the TP3 check,
        // which doesn't fire either since pnl (15%) is below tp3_pct (20%).
        let position = position_at(PositionState::S2Tp2, Won(20_000));
        assert!(evaluate(&position, Won(11_500), &config(), None).is_none());
    }

    #[test]
    fn trailing_fires_at_final_take_profit_tier() {
        let position = position_at(PositionState::S3Tp3, Won(20_000));
        // trail_dist is 8%: trail = 20,000 * 0.92 = 18,400.
        let decision = evaluate(&position, Won(18_300), &config(), None).unwrap();
        assert_eq!(decision.reason, ExitReason::Trailing);
    }
}
