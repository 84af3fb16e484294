//! Average True Range, used by the ATR exit mode to scale stop/target
//! distances to a symbol's recent volatility instead of a fixed percent.

use quant_core::money::Won;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy)]
pub struct Bar {
    pub high: Won,
    pub low: Won,
    pub close: Won,
}

fn true_range(bar: &Bar, prev_close: Won) -> Decimal {
    let high_low = Decimal::from(bar.high.0 - bar.low.0);
    let high_prev = Decimal::from((bar.high.0 - prev_close.0).abs());
    let low_prev = Decimal::from((bar.low.0 - prev_close.0).abs());
    high_low.max(high_prev).max(low_prev)
}

/// Wilder's ATR over `period` bars. `bars` must have at least `period + 1`
/// entries (one extra for the first bar's previous close); returns `None`
/// otherwise.
pub fn atr(bars: &[Bar], period: u32) -> Option<Decimal> {
    let period = period as usize;
    if bars.len() < period + 1 {
        return None;
    }
    let window = &bars[bars.len() - period - 1..];
    let mut true_ranges = Vec::with_capacity(period);
    for i in 1..window.len() {
        true_ranges.push(true_range(&window[i], window[i - 1].close));
    }
    Some(true_ranges.iter().copied().sum::<Decimal>() / Decimal::from(period))
}
