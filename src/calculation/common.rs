//! Common utility functions for withholding calculations.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a currency amount to the cent, half away from zero.
///
/// # Examples
///
/// ```
/// use payroll_withholding::calculation::round_to_cent;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_cent(Decimal::from_str("90.3261").unwrap()), Decimal::from_str("90.33").unwrap());
/// assert_eq!(round_to_cent(Decimal::from_str("0.125").unwrap()), Decimal::from_str("0.13").unwrap());
/// assert_eq!(round_to_cent(Decimal::from_str("124").unwrap()).to_string(), "124.00");
/// ```
pub fn round_to_cent(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Returns `value` clamped below at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
