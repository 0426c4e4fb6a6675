//! Retirement plan contributions.
//!
//! All three plans are above-AGI deductions capped at their annual limit.
//! Employer-side plans (profit share, defined benefit) are paid out of the
//! business and therefore also shrink the QBI base.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::common::{min, non_negative};
use crate::models::{ReasonCode, StrategyDelta, StrategyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetirementPlan {
    EmployeeDeferral,
    ProfitShare,
    DefinedBenefit,
}

impl RetirementPlan {
    fn id(self) -> StrategyId {
        match self {
            Self::EmployeeDeferral => StrategyId::EmployeeDeferral,
            Self::ProfitShare => StrategyId::EmployerProfitShare,
            Self::DefinedBenefit => StrategyId::DefinedBenefit,
        }
    }

    /// Annual contribution limit, if the plan has one.
    fn limit(
        self,
        ctx: &StrategyContext<'_>,
    ) -> Option<Decimal> {
        let federal = ctx.federal();
        match self {
            Self::EmployeeDeferral => Some(federal.employee_deferral_limit),
            Self::ProfitShare => Some(federal.profit_share_limit),
            Self::DefinedBenefit => federal.defined_benefit_limit,
        }
    }

    fn funded_by_business(self) -> bool {
        !matches!(self, Self::EmployeeDeferral)
    }
}

pub fn apply(
    plan: RetirementPlan,
    ctx: &StrategyContext<'_>,
    amount: Decimal,
    mut acc: Accumulator,
) -> Accumulator {
    let id = plan.id();
    let contribution = match plan.limit(ctx) {
        Some(limit) => min(amount, limit),
        None => amount,
    };

    acc.above_agi += contribution;
    if plan.funded_by_business() {
        acc.qbi_base_income = non_negative(acc.qbi_base_income - contribution);
    }
    acc.record(StrategyDelta::success(
        id,
        ReasonCode::FederalDeduction,
        contribution,
    ));
    if contribution < amount {
        acc.record(StrategyDelta::warning(
            id,
            ReasonCode::FederalDeductionCapped,
            amount - contribution,
        ));
    }

    acc.state_deduction_total += contribution;
    if plan == RetirementPlan::EmployeeDeferral && ctx.rules().employee_deferral_add_back {
        warn!(
            jurisdiction = %ctx.profile.jurisdiction,
            %contribution,
            "employee deferral added back to state income"
        );
        acc.state_add_back += contribution;
        acc.record(StrategyDelta::warning(
            id,
            ReasonCode::StateAddBack,
            contribution,
        ));
    } else {
        acc.record(StrategyDelta::success(
            id,
            ReasonCode::StateDeduction,
            contribution,
        ));
    }

    acc
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::TaxTables;
    use crate::models::{ClientFinancialProfile, Jurisdiction};

    fn profile(jurisdiction: Jurisdiction) -> ClientFinancialProfile {
        ClientFinancialProfile {
            w2_income: dec!(250000),
            business_income: dec!(50000),
            jurisdiction,
            ..Default::default()
        }
    }

    fn run(
        plan: RetirementPlan,
        jurisdiction: Jurisdiction,
        amount: Decimal,
    ) -> Accumulator {
        let tables = TaxTables::default_2025();
        let profile = profile(jurisdiction);
        let ctx = StrategyContext::new(&profile, &tables);
        apply(plan, &ctx, amount, Accumulator::for_profile(&profile))
    }

    // =========================================================================
    // Federal treatment
    // =========================================================================

    #[test]
    fn employee_deferral_is_capped_at_limit() {
        let acc = run(RetirementPlan::EmployeeDeferral, Jurisdiction::NewYork, dec!(30000));

        assert_eq!(acc.above_agi, dec!(23500));
        assert_eq!(acc.qbi_base_income, dec!(50000));
        assert!(acc.deltas.contains(&StrategyDelta::warning(
            StrategyId::EmployeeDeferral,
            ReasonCode::FederalDeductionCapped,
            dec!(6500),
        )));
    }

    #[test]
    fn profit_share_reduces_qbi_base() {
        let acc = run(RetirementPlan::ProfitShare, Jurisdiction::NewYork, dec!(40000));

        assert_eq!(acc.above_agi, dec!(40000));
        assert_eq!(acc.qbi_base_income, dec!(10000));
    }

    #[test]
    fn defined_benefit_floors_qbi_base_at_zero() {
        let acc = run(RetirementPlan::DefinedBenefit, Jurisdiction::NewYork, dec!(150000));

        assert_eq!(acc.above_agi, dec!(150000));
        assert_eq!(acc.qbi_base_income, dec!(0));
    }

    // =========================================================================
    // State treatment
    // =========================================================================

    #[test]
    fn add_back_state_reinstates_employee_deferral() {
        let acc = run(RetirementPlan::EmployeeDeferral, Jurisdiction::Pennsylvania, dec!(20000));

        assert_eq!(acc.state_deduction_total, dec!(20000));
        assert_eq!(acc.state_add_back, dec!(20000));
    }

    #[test]
    fn employer_plans_are_state_deductible_everywhere() {
        let acc = run(RetirementPlan::ProfitShare, Jurisdiction::Pennsylvania, dec!(20000));

        assert_eq!(acc.state_deduction_total, dec!(20000));
        assert_eq!(acc.state_add_back, dec!(0));
    }
}
