//! Equipment expensing.
//!
//! The federal deduction is limited by the cost, the remaining QBI base and
//! the statutory cap. States with their own, lower cap add the difference
//! back to state income.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::common::{min, round_half_up};
use crate::models::{ReasonCode, StrategyDelta, StrategyId};

const ID: StrategyId = StrategyId::EquipmentExpensing;

pub fn apply(
    ctx: &StrategyContext<'_>,
    equipment_cost: Decimal,
    mut acc: Accumulator,
) -> Accumulator {
    let federal_cap = ctx.federal().equipment_expensing_cap;
    let deduction = round_half_up(min(
        min(equipment_cost, acc.qbi_base_income),
        federal_cap,
    ));

    acc.qbi_base_income -= deduction;
    acc.above_agi += deduction;
    acc.record(StrategyDelta::success(
        ID,
        ReasonCode::FederalDeduction,
        deduction,
    ));
    if deduction < equipment_cost {
        acc.record(StrategyDelta::warning(
            ID,
            ReasonCode::FederalDeductionCapped,
            equipment_cost - deduction,
        ));
    }

    acc.state_deduction_total += deduction;
    match ctx.rules().equipment_deduction_cap {
        Some(state_cap) if deduction > state_cap => {
            let add_back = deduction - state_cap;
            warn!(
                jurisdiction = %ctx.profile.jurisdiction,
                %add_back,
                "equipment deduction exceeds state cap"
            );
            acc.state_add_back += add_back;
            acc.record(StrategyDelta::warning(
                ID,
                ReasonCode::StateAddBack,
                add_back,
            ));
        }
        _ => acc.record(StrategyDelta::success(
            ID,
            ReasonCode::StateDeduction,
            deduction,
        )),
    }

    acc
}
