use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single band of a progressive rate schedule.
///
/// `max_income` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }
}

/// Errors raised when a bracket schedule does not partition `[0, ∞)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    FirstBracketNotZero(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has max {max} not above min {min}")]
    InvertedBounds {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd(usize),

    #[error("last bracket must be unbounded")]
    LastBracketBounded,

    #[error("bracket {index} has negative rate {rate}")]
    NegativeRate { index: usize, rate: Decimal },
}

/// An ordered, validated progressive schedule.
///
/// Construction guarantees the brackets are ascending, contiguous, start at
/// zero and end with an unbounded bracket, so the calculator never has to
/// re-check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates and wraps a list of brackets.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] describing the first violation found.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketTableError::FirstBracketNotZero(first.min_income));
        }

        let last_index = brackets.len() - 1;
        let mut expected_min = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.tax_rate < Decimal::ZERO {
                return Err(BracketTableError::NegativeRate {
                    index,
                    rate: bracket.tax_rate,
                });
            }
            if bracket.min_income != expected_min {
                return Err(BracketTableError::NotContiguous {
                    index,
                    expected: expected_min,
                    found: bracket.min_income,
                });
            }
            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(BracketTableError::InvertedBounds {
                        index,
                        min: bracket.min_income,
                        max,
                    });
                }
                Some(_) if index == last_index => {
                    return Err(BracketTableError::LastBracketBounded);
                }
                Some(max) => expected_min = max,
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeEnd(index));
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    /// Builds a table from `(rate, upper bound)` pairs; each bracket starts
    /// where the previous one ended.
    ///
    /// # Errors
    ///
    /// Same as [`BracketTable::new`].
    pub fn from_rates(rows: &[(Decimal, Option<Decimal>)]) -> Result<Self, BracketTableError> {
        Self::new(Self::chained(rows).brackets)
    }

    /// Chains rows without validating them. Only for schedules whose shape
    /// is fixed in source.
    pub(crate) fn chained(rows: &[(Decimal, Option<Decimal>)]) -> Self {
        let mut min_income = Decimal::ZERO;
        let mut brackets = Vec::with_capacity(rows.len());
        for &(rate, max_income) in rows {
            brackets.push(TaxBracket::new(min_income, max_income, rate));
            if let Some(max) = max_income {
                min_income = max;
            }
        }
        Self { brackets }
    }

    /// A single unbounded bracket at `rate`.
    pub fn flat(rate: Decimal) -> Result<Self, BracketTableError> {
        Self::from_rates(&[(rate, None)])
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Marginal rate applied to the next dollar above `income`.
    pub fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .find(|b| b.max_income.is_none_or(|max| income < max))
            .map(|b| b.tax_rate)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_band() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(dec!(10000), None, dec!(0.20)),
        ]
    }

    #[test]
    fn new_accepts_contiguous_table() {
        let table = BracketTable::new(two_band()).unwrap();

        assert_eq!(table.brackets().len(), 2);
    }

    #[test]
    fn new_rejects_empty_table() {
        assert_eq!(BracketTable::new(vec![]), Err(BracketTableError::Empty));
    }

    #[test]
    fn new_rejects_nonzero_start() {
        let brackets = vec![TaxBracket::new(dec!(100), None, dec!(0.10))];

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::FirstBracketNotZero(dec!(100)))
        );
    }

    #[test]
    fn new_rejects_gap() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(dec!(12000), None, dec!(0.20)),
        ];

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::NotContiguous {
                index: 1,
                expected: dec!(10000),
                found: dec!(12000),
            })
        );
    }

    #[test]
    fn new_rejects_overlap() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(dec!(9000), None, dec!(0.20)),
        ];

        assert!(matches!(
            BracketTable::new(brackets),
            Err(BracketTableError::NotContiguous { index: 1, .. })
        ));
    }

    #[test]
    fn new_rejects_unsorted_bounds() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(dec!(10000), Some(dec!(5000)), dec!(0.20)),
            TaxBracket::new(dec!(5000), None, dec!(0.30)),
        ];

        assert!(matches!(
            BracketTable::new(brackets),
            Err(BracketTableError::InvertedBounds { index: 1, .. })
        ));
    }

    #[test]
    fn new_rejects_bounded_last_bracket() {
        let brackets = vec![TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10))];

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::LastBracketBounded)
        );
    }

    #[test]
    fn new_rejects_unbounded_middle_bracket() {
        let brackets = vec![
            TaxBracket::new(dec!(0), None, dec!(0.10)),
            TaxBracket::new(dec!(10000), None, dec!(0.20)),
        ];

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::UnboundedBeforeEnd(0))
        );
    }

    #[test]
    fn new_rejects_negative_rate() {
        let brackets = vec![TaxBracket::new(dec!(0), None, dec!(-0.01))];

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::NegativeRate {
                index: 0,
                rate: dec!(-0.01),
            })
        );
    }

    #[test]
    fn from_rates_chains_bounds() {
        let table =
            BracketTable::from_rates(&[(dec!(0.10), Some(dec!(10000))), (dec!(0.20), None)])
                .unwrap();

        assert_eq!(table.brackets(), two_band().as_slice());
    }

    #[test]
    fn marginal_rate_picks_containing_bracket() {
        let table = BracketTable::new(two_band()).unwrap();

        assert_eq!(table.marginal_rate(dec!(5000)), dec!(0.10));
        assert_eq!(table.marginal_rate(dec!(10000)), dec!(0.20));
        assert_eq!(table.marginal_rate(dec!(1000000)), dec!(0.20));
    }

    #[test]
    fn deserialize_validates_table() {
        let json = r#"[{"min_income":"0","max_income":"100","tax_rate":"0.1"}]"#;

        let result: Result<BracketTable, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
