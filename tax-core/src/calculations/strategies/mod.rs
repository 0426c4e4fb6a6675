//! Strategy processors and the pipeline that folds them over one year.
//!
//! Each processor is a pure function from (context, input amount,
//! accumulator) to a new accumulator. [`StrategyPipeline::run`] applies the
//! enabled ones in catalog order; the QBI deduction is left to the engine.

pub mod alternative_investment;
pub mod capital_loss;
pub mod charitable;
pub mod equipment;
pub mod qbi;
pub mod retirement;

use rust_decimal::Decimal;
use tracing::debug;

use alternative_investment::AlternativeInvestment;
use retirement::RetirementPlan;

use crate::calculations::TaxEngineError;
use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::models::{EnabledStrategySet, StrategyDefinition, StrategyId, StrategyKind};

/// One processor per strategy id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CapitalLossHarvesting,
    EquipmentExpensing,
    Retirement(RetirementPlan),
    CharitableStructure,
    AlternativeInvestment(AlternativeInvestment),
    QualifiedBusinessIncome,
}

impl From<StrategyId> for Strategy {
    fn from(id: StrategyId) -> Self {
        match id {
            StrategyId::CapitalLossHarvesting => Self::CapitalLossHarvesting,
            StrategyId::EquipmentExpensing => Self::EquipmentExpensing,
            StrategyId::EmployeeDeferral => Self::Retirement(RetirementPlan::EmployeeDeferral),
            StrategyId::EmployerProfitShare => Self::Retirement(RetirementPlan::ProfitShare),
            StrategyId::DefinedBenefit => Self::Retirement(RetirementPlan::DefinedBenefit),
            StrategyId::CharitableStructure => Self::CharitableStructure,
            StrategyId::EnergyInvestment => Self::AlternativeInvestment(AlternativeInvestment::Energy),
            StrategyId::ProductionFinancing => {
                Self::AlternativeInvestment(AlternativeInvestment::Production)
            }
            StrategyId::QualifiedBusinessIncome => Self::QualifiedBusinessIncome,
        }
    }
}

impl Strategy {
    /// Applies this strategy's effect for `amount`.
    ///
    /// For QBI `amount` is taxable income before the deduction, not an input
    /// field; see [`qbi::apply`].
    pub fn apply(
        self,
        ctx: &StrategyContext<'_>,
        amount: Decimal,
        acc: Accumulator,
    ) -> Result<Accumulator, TaxEngineError> {
        let acc = match self {
            Self::CapitalLossHarvesting => return capital_loss::apply(ctx, amount, acc),
            Self::EquipmentExpensing => equipment::apply(ctx, amount, acc),
            Self::Retirement(plan) => retirement::apply(plan, ctx, amount, acc),
            Self::CharitableStructure => charitable::apply(ctx, amount, acc),
            Self::AlternativeInvestment(investment) => {
                alternative_investment::apply(investment, ctx, amount, acc)
            }
            Self::QualifiedBusinessIncome => qbi::apply(ctx, amount, acc),
        };
        Ok(acc)
    }
}

/// Runs the enabled strategies in catalog order.
pub struct StrategyPipeline;

impl StrategyPipeline {
    /// Folds every enabled, non-QBI strategy over a fresh accumulator.
    ///
    /// # Errors
    ///
    /// Propagates the first processor error, which today can only come from
    /// an unknown or missing exposure level.
    pub fn run(
        ctx: &StrategyContext<'_>,
        enabled: &EnabledStrategySet,
    ) -> Result<Accumulator, TaxEngineError> {
        enabled
            .enabled_definitions()
            .filter(|definition| definition.kind != StrategyKind::Qbi)
            .try_fold(Accumulator::for_profile(ctx.profile), |acc, definition| {
                Self::step(ctx, definition, acc)
            })
    }

    fn step(
        ctx: &StrategyContext<'_>,
        definition: &StrategyDefinition,
        mut acc: Accumulator,
    ) -> Result<Accumulator, TaxEngineError> {
        let amount = definition
            .input_required
            .map(|field| ctx.profile.input_amount(field))
            .unwrap_or(Decimal::ZERO);

        if amount > Decimal::ZERO {
            acc.capital_allocated += amount;
        }

        debug!(strategy = %definition.id, %amount, "applying strategy");
        Strategy::from(definition.id).apply(ctx, amount, acc)
    }
}
