//! Integer minor-unit monetary values and the `Σweights = 1.0 ± ε` helper.
//!
//! Weight-sum equality checks stay as explicit calls rather than overloaded
//! comparisons — `validate_weights` is that explicit helper.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use thiserror::Error;

/// A won amount in minor units. All monetary fields in this workspace are
/// `Won`, never floating point.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Won(pub i64);

impl Won {
    pub const ZERO: Won = Won(0);

    pub fn checked_mul_ratio(self, ratio: Decimal) -> Option<Won> {
        let scaled = Decimal::from(self.0).checked_mul(ratio)?;
        scaled.round_dp(0).to_i64().map(Won)
    }
}

impl Add for Won {
    type Output = Won;
    fn add(self, rhs: Self) -> Self::Output {
        Won(self.0 + rhs.0)
    }
}

impl Sub for Won {
    type Output = Won;
    fn sub(self, rhs: Self) -> Self::Output {
        Won(self.0 - rhs.0)
    }
}

/// A weight in `[0, 1]`, represented with `Decimal` so that sum-to-one
/// invariants can be validated without floating point rounding surprises.
pub type Weight = Decimal;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("weights summed to {actual}, expected {target} within tolerance {tolerance}")]
pub struct WeightSumError {
    pub actual: Decimal,
    pub target: Decimal,
    pub tolerance: Decimal,
}

/// Validates that `weights` sum to `target` within `tolerance`. This is kept
/// as a free function rather than hidden behind an operator overload so
/// weight-sum equality stays visible at call sites.
pub fn validate_weights<I>(weights: I, target: Decimal, tolerance: Decimal) -> Result<Decimal, WeightSumError>
where
    I: IntoIterator<Item = Decimal>,
{
    let sum: Decimal = weights.into_iter().sum();
    if (sum - target).abs() <= tolerance {
        Ok(sum)
    } else {
        Err(WeightSumError {
            actual: sum,
            target,
            tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn validate_weights_within_tolerance_passes() {
        let weights = vec![dec!(0.3), dec!(0.3), dec!(0.4)];
        assert!(validate_weights(weights, dec!(1.0), dec!(0.000001)).is_ok());
    }

    #[test]
    fn validate_weights_outside_tolerance_fails() {
        let weights = vec![dec!(0.3), dec!(0.3), dec!(0.3)];
        let err = validate_weights(weights, dec!(1.0), dec!(0.01)).unwrap_err();
        assert_eq!(err.actual, dec!(0.9));
    }

    #[test]
    fn won_checked_mul_ratio() {
        let amount = Won(100_000);
        let half = amount.checked_mul_ratio(dec!(0.5)).unwrap();
        assert_eq!(half, Won(50_000));
    }
}
