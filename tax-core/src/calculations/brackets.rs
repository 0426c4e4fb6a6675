//! Progressive bracket tax.
//!
//! Walks a schedule from the bottom, taxing each slice of income at its
//! bracket's rate:
//!
//! ```text
//! tax += rate × (min(income, bracket.max) − previous_max)
//! ```
//!
//! and stops once income no longer reaches the next bracket. The result is
//! continuous at bracket boundaries and non-decreasing in income.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::bracket_tax;
//! use tax_core::BracketTable;
//!
//! let table = BracketTable::from_rates(&[
//!     (dec!(0.10), Some(dec!(10000))),
//!     (dec!(0.20), None),
//! ])
//! .unwrap();
//!
//! assert_eq!(bracket_tax(dec!(15000), &table), dec!(2000.00));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{min, round_half_up};
use crate::models::{BracketTable, TaxBracket};

/// Tax owed on `income` under a validated schedule, rounded to the cent.
pub fn bracket_tax(
    income: Decimal,
    table: &BracketTable,
) -> Decimal {
    tax_over_brackets(income, table.brackets())
}

/// Same walk over a raw slice. An empty slice or non-positive income owes
/// nothing.
pub fn tax_over_brackets(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut previous_max = Decimal::ZERO;

    for bracket in brackets {
        if income <= previous_max {
            break;
        }
        let upper = match bracket.max_income {
            Some(max) => min(income, max),
            None => income,
        };
        tax += bracket.tax_rate * (upper - previous_max);
        match bracket.max_income {
            Some(max) => previous_max = max,
            None => break,
        }
    }

    round_half_up(tax)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::TaxTables;

    fn two_band() -> BracketTable {
        BracketTable::from_rates(&[(dec!(0.10), Some(dec!(10000))), (dec!(0.20), None)]).unwrap()
    }

    #[test]
    fn zero_income_owes_nothing() {
        assert_eq!(bracket_tax(dec!(0), &two_band()), dec!(0));
    }

    #[test]
    fn negative_income_owes_nothing() {
        assert_eq!(bracket_tax(dec!(-5000), &two_band()), dec!(0));
    }

    #[test]
    fn empty_slice_owes_nothing() {
        assert_eq!(tax_over_brackets(dec!(50000), &[]), dec!(0));
    }

    #[test]
    fn income_within_first_bracket() {
        assert_eq!(bracket_tax(dec!(8000), &two_band()), dec!(800.00));
    }

    #[test]
    fn income_spanning_two_brackets() {
        // 10% of 10,000 + 20% of 5,000
        assert_eq!(bracket_tax(dec!(15000), &two_band()), dec!(2000.00));
    }

    #[test]
    fn income_at_boundary_is_continuous() {
        let table = two_band();

        let at = bracket_tax(dec!(10000), &table);
        let just_above = bracket_tax(dec!(10000.01), &table);

        assert_eq!(at, dec!(1000.00));
        assert_eq!(just_above, dec!(1000.00));
    }

    #[test]
    fn tax_is_non_decreasing_in_income() {
        let tables = TaxTables::default_2025();
        let mut previous = Decimal::ZERO;

        for step in 0..400 {
            let income = Decimal::from(step * 2500);
            let tax = bracket_tax(income, &tables.federal_brackets);
            assert!(tax >= previous, "tax fell at income {income}");
            previous = tax;
        }
    }

    #[test]
    fn federal_schedule_matches_published_base_tax() {
        let tables = TaxTables::default_2025();

        // Base tax at the 22% threshold is 5,578.50; plus 22% of 36,525.
        assert_eq!(
            bracket_tax(dec!(85000), &tables.federal_brackets),
            dec!(13614.00)
        );
        assert_eq!(
            bracket_tax(dec!(700000), &tables.federal_brackets),
            dec!(216020.25)
        );
    }

    #[test]
    fn flat_schedule_is_proportional() {
        let table = BracketTable::flat(dec!(0.0307)).unwrap();

        assert_eq!(bracket_tax(dec!(100000), &table), dec!(3070.00));
    }
}
