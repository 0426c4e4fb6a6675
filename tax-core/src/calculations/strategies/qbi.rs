//! Qualified business income deduction.
//!
//! Unlike the other strategies this one needs the taxable income computed
//! after every other deduction, so the pipeline skips it and the engine
//! applies it with that income as the amount.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::common::{min, round_half_up};
use crate::models::{ReasonCode, StrategyDelta, StrategyId};

const ID: StrategyId = StrategyId::QualifiedBusinessIncome;

/// Stores the deduction in [`Accumulator::qbi_deduction`].
///
/// Taxable income at or above the ceiling zeroes the deduction.
pub fn apply(
    ctx: &StrategyContext<'_>,
    taxable_before_qbi: Decimal,
    mut acc: Accumulator,
) -> Accumulator {
    let federal = ctx.federal();

    if taxable_before_qbi >= federal.qbi_taxable_income_ceiling {
        warn!(
            taxable_income = %taxable_before_qbi,
            ceiling = %federal.qbi_taxable_income_ceiling,
            "QBI deduction unavailable above income ceiling"
        );
        acc.record(StrategyDelta::warning(
            ID,
            ReasonCode::QbiIncomeCeilingExceeded,
            taxable_before_qbi,
        ));
        acc.qbi_deduction = Decimal::ZERO;
        return acc;
    }

    let rate = federal.qbi_deduction_rate;
    let deduction = round_half_up(min(rate * acc.qbi_base_income, rate * taxable_before_qbi));
    acc.record(StrategyDelta::success(ID, ReasonCode::QbiDeduction, deduction));
    acc.qbi_deduction = deduction;

    acc
}
