//! Charitable giving structure.
//!
//! The federal deduction is limited to a share of earned income net of the
//! above-AGI deductions taken so far, which is why this strategy runs after
//! the equipment and retirement strategies.

use rust_decimal::Decimal;

use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::common::{min, non_negative, round_half_up};
use crate::models::{ReasonCode, StrategyDelta, StrategyId};

const ID: StrategyId = StrategyId::CharitableStructure;

pub fn apply(
    ctx: &StrategyContext<'_>,
    intended_amount: Decimal,
    mut acc: Accumulator,
) -> Accumulator {
    let earned = non_negative(ctx.profile.w2_income + ctx.profile.business_income - acc.above_agi);
    let limit = round_half_up(earned * ctx.federal().charitable_agi_limit_rate);
    let deduction = min(intended_amount, limit);

    acc.below_agi += deduction;
    acc.record(StrategyDelta::success(
        ID,
        ReasonCode::FederalDeduction,
        deduction,
    ));
    if deduction < intended_amount {
        acc.record(StrategyDelta::warning(
            ID,
            ReasonCode::FederalDeductionCapped,
            intended_amount - deduction,
        ));
    }

    match ctx.rules().charitable_pass_through_rate {
        Some(rate) => {
            let state_deduction = round_half_up(deduction * rate);
            acc.state_deduction_total += state_deduction;
            acc.record(StrategyDelta::success(
                ID,
                ReasonCode::StateDeduction,
                state_deduction,
            ));
        }
        None => acc.record(StrategyDelta::warning(
            ID,
            ReasonCode::StateDeductionDisallowed,
            deduction,
        )),
    }

    acc
}
