//! Energy and production financing deductions.

use rust_decimal::Decimal;

use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::common::round_half_up;
use crate::models::{ReasonCode, StrategyDelta, StrategyId};

/// Which alternative investment is being deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeInvestment {
    Energy,
    Production,
}

impl AlternativeInvestment {
    fn id(self) -> StrategyId {
        match self {
            Self::Energy => StrategyId::EnergyInvestment,
            Self::Production => StrategyId::ProductionFinancing,
        }
    }

    fn deduction_rate(
        self,
        ctx: &StrategyContext<'_>,
    ) -> Decimal {
        match self {
            Self::Energy => ctx.federal().energy_deduction_rate,
            Self::Production => ctx.federal().production_deduction_rate,
        }
    }
}

pub fn apply(
    investment: AlternativeInvestment,
    ctx: &StrategyContext<'_>,
    amount: Decimal,
    mut acc: Accumulator,
) -> Accumulator {
    let id = investment.id();
    let deduction = round_half_up(amount * investment.deduction_rate(ctx));

    acc.below_agi += deduction;
    acc.record(StrategyDelta::success(
        id,
        ReasonCode::FederalDeduction,
        deduction,
    ));

    if ctx.rules().conforms_to_alternative_investments {
        acc.state_deduction_total += deduction;
        acc.record(StrategyDelta::success(
            id,
            ReasonCode::StateDeduction,
            deduction,
        ));
    } else {
        acc.record(StrategyDelta::warning(
            id,
            ReasonCode::StateDeductionDisallowed,
            deduction,
        ));
    }

    acc
}
