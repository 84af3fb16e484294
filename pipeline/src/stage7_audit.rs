//! S7 Audit Analyzer: post-hoc performance attribution over
//! a closed run's realized returns. Runs after every run that reached S0
//! pass, independent of whether S6 actually submitted orders.

use chrono::NaiveDate;
use quant_core::ids::{RunId, StrategyId};
use rust_decimal::{Decimal, MathematicalOps};

#[derive(Debug, Clone, Copy)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub portfolio_return: Decimal,
}

#[derive(Debug, Clone)]
pub struct FactorAttribution {
    pub momentum: Decimal,
    pub technical: Decimal,
    pub value: Decimal,
    pub quality: Decimal,
    pub flow: Decimal,
    pub event: Decimal,
    /// Portfolio return not explained by the six factor contributions.
    pub residual: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub run_id: RunId,
    pub strategy_id: StrategyId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_return: String,
    pub cagr: String,
    pub volatility: String,
    pub sharpe: String,
    pub sortino: String,
    pub max_drawdown: String,
    pub win_rate: String,
    pub profit_factor: String,
}

fn total_return(returns: &[DailyReturn]) -> Decimal {
    returns
        .iter()
        .fold(Decimal::ONE, |acc, r| acc * (Decimal::ONE + r.portfolio_return))
        - Decimal::ONE
}

fn cagr(returns: &[DailyReturn], trading_days_per_year: Decimal) -> Decimal {
    if returns.is_empty() {
        return Decimal::ZERO;
    }
    let cumulative = Decimal::ONE + total_return(returns);
    let years = Decimal::from(returns.len()) / trading_days_per_year;
    if years.is_zero() {
        return Decimal::ZERO;
    }
    // cumulative^(1/years) - 1, via exp/ln since Decimal has no fractional pow.
    let exponent = Decimal::ONE / years;
    match cumulative.checked_ln() {
        Some(ln_cumulative) => match (ln_cumulative * exponent).checked_exp() {
            Some(grown) => grown - Decimal::ONE,
            None => Decimal::ZERO,
        },
        None => Decimal::ZERO,
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        Decimal::ZERO
    } else {
        values.iter().copied().sum::<Decimal>() / Decimal::from(values.len())
    }
}

fn stddev(values: &[Decimal], mean_value: Decimal) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let variance = values
        .iter()
        .map(|v| (*v - mean_value) * (*v - mean_value))
        .sum::<Decimal>()
        / Decimal::from(values.len());
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

fn volatility(returns: &[DailyReturn], trading_days_per_year: Decimal) -> Decimal {
    let values: Vec<Decimal> = returns.iter().map(|r| r.portfolio_return).collect();
    let daily_stddev = stddev(&values, mean(&values));
    daily_stddev * trading_days_per_year.sqrt().unwrap_or(Decimal::ZERO)
}

fn sharpe(returns: &[DailyReturn], risk_free_rate: Decimal, trading_days_per_year: Decimal) -> Decimal {
    let daily_rf = risk_free_rate / trading_days_per_year;
    let excess: Vec<Decimal> = returns.iter().map(|r| r.portfolio_return - daily_rf).collect();
    let excess_mean = mean(&excess);
    let excess_stddev = stddev(&excess, excess_mean);
    if excess_stddev.is_zero() {
        return Decimal::ZERO;
    }
    (excess_mean / excess_stddev) * trading_days_per_year.sqrt().unwrap_or(Decimal::ZERO)
}

fn sortino(returns: &[DailyReturn], risk_free_rate: Decimal, trading_days_per_year: Decimal) -> Decimal {
    let daily_rf = risk_free_rate / trading_days_per_year;
    let excess: Vec<Decimal> = returns.iter().map(|r| r.portfolio_return - daily_rf).collect();
    let downside: Vec<Decimal> = excess.iter().copied().filter(|v| *v < Decimal::ZERO).collect();
    if downside.is_empty() {
        return Decimal::ZERO;
    }
    let downside_deviation = (downside.iter().map(|v| v * v).sum::<Decimal>() / Decimal::from(excess.len()))
        .sqrt()
        .unwrap_or(Decimal::ZERO);
    if downside_deviation.is_zero() {
        return Decimal::ZERO;
    }
    (mean(&excess) / downside_deviation) * trading_days_per_year.sqrt().unwrap_or(Decimal::ZERO)
}

fn max_drawdown(returns: &[DailyReturn]) -> Decimal {
    let mut peak = Decimal::ONE;
    let mut nav = Decimal::ONE;
    let mut worst = Decimal::ZERO;
    for r in returns {
        nav *= Decimal::ONE + r.portfolio_return;
        peak = peak.max(nav);
        let drawdown = (nav - peak) / peak;
        worst = worst.min(drawdown);
    }
    worst
}

fn win_rate(returns: &[DailyReturn]) -> Decimal {
    if returns.is_empty() {
        return Decimal::ZERO;
    }
    let wins = returns.iter().filter(|r| r.portfolio_return > Decimal::ZERO).count();
    Decimal::from(wins) / Decimal::from(returns.len())
}

fn profit_factor(returns: &[DailyReturn]) -> Decimal {
    let gains: Decimal = returns.iter().filter(|r| r.portfolio_return > Decimal::ZERO).map(|r| r.portfolio_return).sum();
    let losses: Decimal = returns
        .iter()
        .filter(|r| r.portfolio_return < Decimal::ZERO)
        .map(|r| -r.portfolio_return)
        .sum();
    if losses.is_zero() {
        if gains.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::MAX
        }
    } else {
        gains / losses
    }
}

/// Regresses daily portfolio returns against each factor's cross-sectional
/// contribution; `residual` is whatever the six factors don't explain.
/// `exposures` is one entry per trading day, matching `returns` by index.
pub fn factor_attribution(
    returns: &[DailyReturn],
    exposures: &[[Decimal; 6]],
    factor_returns: &[Decimal],
) -> FactorAttribution {
    let explained: Vec<Decimal> = exposures
        .iter()
        .map(|e| e.iter().zip(factor_returns).map(|(exp, ret)| exp * ret).sum())
        .collect();
    let explained_total: Decimal = explained.iter().copied().sum();
    let total: Decimal = returns.iter().map(|r| r.portfolio_return).sum();

    let mut per_factor = [Decimal::ZERO; 6];
    for exposure in exposures {
        for (i, exp) in exposure.iter().enumerate() {
            per_factor[i] += exp * factor_returns.get(i).copied().unwrap_or(Decimal::ZERO);
        }
    }

    FactorAttribution {
        momentum: per_factor[0],
        technical: per_factor[1],
        value: per_factor[2],
        quality: per_factor[3],
        flow: per_factor[4],
        event: per_factor[5],
        residual: total - explained_total,
    }
}

const TRADING_DAYS_PER_YEAR: i64 = 252;

pub fn compute(
    run_id: RunId,
    strategy_id: StrategyId,
    returns: &[DailyReturn],
    risk_free_rate: Decimal,
) -> AuditReport {
    let trading_days = Decimal::from(TRADING_DAYS_PER_YEAR);
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let period_start = returns.first().map(|r| r.date).unwrap_or(epoch);
    let period_end = returns.last().map(|r| r.date).unwrap_or(epoch);

    AuditReport {
        run_id,
        strategy_id,
        period_start,
        period_end,
        total_return: total_return(returns).to_string(),
        cagr: cagr(returns, trading_days).to_string(),
        volatility: volatility(returns, trading_days).to_string(),
        sharpe: sharpe(returns, risk_free_rate, trading_days).to_string(),
        sortino: sortino(returns, risk_free_rate, trading_days).to_string(),
        max_drawdown: max_drawdown(returns).to_string(),
        win_rate: win_rate(returns).to_string(),
        profit_factor: profit_factor(returns).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(date: NaiveDate, ret: Decimal) -> DailyReturn {
        DailyReturn { date, portfolio_return: ret }
    }

    #[test]
    fn flat_returns_have_zero_drawdown_and_full_win_rate() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let returns = vec![day(d, dec!(0.01)), day(d, dec!(0.01)), day(d, dec!(0.01))];
        assert_eq!(max_drawdown(&returns), Decimal::ZERO);
        assert_eq!(win_rate(&returns), Decimal::ONE);
    }

    #[test]
    fn drawdown_is_negative_after_a_loss() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let returns = vec![day(d, dec!(0.10)), day(d, dec!(-0.20))];
        assert!(max_drawdown(&returns) < Decimal::ZERO);
    }

    #[test]
    fn profit_factor_is_ratio_of_gains_to_losses() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let returns = vec![day(d, dec!(0.10)), day(d, dec!(-0.05))];
        assert_eq!(profit_factor(&returns), dec!(2));
    }

    #[test]
    fn factor_attribution_residual_captures_unexplained_return() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let returns = vec![day(d, dec!(0.05))];
        let exposures = vec![[dec!(1), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0)]];
        let factor_returns = vec![dec!(0.02), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0)];
        let attribution = factor_attribution(&returns, &exposures, &factor_returns);
        assert_eq!(attribution.momentum, dec!(0.02));
        assert_eq!(attribution.residual, dec!(0.03));
    }
}
