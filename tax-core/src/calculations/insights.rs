//! Turns [`StrategyDelta`] records into short human-readable insights.
//!
//! The numeric core never builds strings; everything user-facing about a
//! strategy's effect is produced here from the reason code and amount.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::models::{Insight, Jurisdiction, ReasonCode, StrategyDelta};

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

pub fn describe(
    delta: &StrategyDelta,
    jurisdiction: Jurisdiction,
) -> Insight {
    let amount = format_currency(delta.amount);
    let state = jurisdiction.name();

    let text = match delta.reason {
        ReasonCode::ShortTermGainsOffset => {
            format!("Harvested losses offset {amount} of short-term gains")
        }
        ReasonCode::LongTermGainsOffset => {
            format!("Remaining losses offset {amount} of long-term gains")
        }
        ReasonCode::LongTermGainGenerated => {
            format!("The overlay realizes {amount} of new long-term gains")
        }
        ReasonCode::OrdinaryIncomeOffset => {
            format!("{amount} of net capital loss offsets ordinary income")
        }
        ReasonCode::ExcessLossCarriedForward => {
            format!("{amount} of unused capital loss carries forward to future years")
        }
        ReasonCode::FederalDeduction => {
            format!("{} deducts {amount} federally", delta.strategy.definition().name)
        }
        ReasonCode::FederalDeductionCapped => {
            format!("{amount} exceeds the federal limit and is not deductible this year")
        }
        ReasonCode::StateDeduction => format!("{state} allows a {amount} state deduction"),
        ReasonCode::StateAddBack => {
            format!("{state} adds back {amount} to state taxable income")
        }
        ReasonCode::StateDeductionDisallowed => {
            format!("{state} does not allow the {amount} deduction")
        }
        ReasonCode::QbiDeduction => format!("Qualified business income deduction of {amount}"),
        ReasonCode::QbiIncomeCeilingExceeded => format!(
            "Taxable income of {amount} is above the QBI ceiling, so no deduction applies"
        ),
    };

    Insight {
        strategy: delta.strategy,
        kind: delta.kind,
        text,
    }
}

/// Renders every delta, preserving order.
pub fn render(
    deltas: &[StrategyDelta],
    jurisdiction: Jurisdiction,
) -> Vec<Insight> {
    deltas
        .iter()
        .map(|delta| describe(delta, jurisdiction))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{InsightKind, StrategyId};

    // =========================================================================
    // format_currency tests
    // =========================================================================

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999)), "$999.00");
        assert_eq!(format_currency(dec!(1000)), "$1,000.00");
    }

    #[test]
    fn format_currency_handles_zero_and_negatives() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(-2500.5)), "-$2,500.50");
    }

    // =========================================================================
    // describe tests
    // =========================================================================

    #[test]
    fn describe_keeps_kind_and_strategy() {
        let delta = StrategyDelta::warning(
            StrategyId::EquipmentExpensing,
            ReasonCode::StateAddBack,
            dec!(125000),
        );

        let insight = describe(&delta, Jurisdiction::Pennsylvania);

        assert_eq!(insight.kind, InsightKind::Warning);
        assert_eq!(insight.strategy, StrategyId::EquipmentExpensing);
        assert_eq!(
            insight.text,
            "Pennsylvania adds back $125,000.00 to state taxable income"
        );
    }

    #[test]
    fn render_preserves_order() {
        let deltas = vec![
            StrategyDelta::success(
                StrategyId::CapitalLossHarvesting,
                ReasonCode::ShortTermGainsOffset,
                dec!(5000),
            ),
            StrategyDelta::success(
                StrategyId::QualifiedBusinessIncome,
                ReasonCode::QbiDeduction,
                dec!(12000),
            ),
        ];

        let insights = render(&deltas, Jurisdiction::NewYork);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[1].text, "Qualified business income deduction of $12,000.00");
    }
}
