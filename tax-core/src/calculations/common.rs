//! Common utility functions for tax calculations.
//!
//! Rounding and clamping helpers shared by the bracket calculator, the
//! strategy processors and the engine.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// // 32% of 1,234.5678
/// assert_eq!(round_half_up(dec!(395.061696)), dec!(395.06));
/// assert_eq!(round_half_up(dec!(1192.505)), dec!(1192.51));
/// assert_eq!(round_half_up(dec!(-2500.505)), dec!(-2500.51));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// The larger of two amounts; the engine uses it for the AMT floor.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Clamps a value to zero or above. Used to coerce every monetary input.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(-5)), dec!(0));
/// assert_eq!(non_negative(dec!(5)), dec!(5));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}
