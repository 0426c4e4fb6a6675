//! Per-year tax liability with and without planning strategies.
//!
//! # Calculation order
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Clamp every monetary input to zero or above |
//! | 2–3  | Fold the enabled strategies over a fresh accumulator |
//! | 4    | Ordinary income = wages + business income + remaining short-term gains |
//! | 5    | Federal AGI = ordinary income − above-AGI deductions (minimum 0) |
//! | 6    | AMT on AGI less the phased-out exemption |
//! | 7    | Taxable income before QBI = AGI − standard deduction − below-AGI deductions |
//! | 8    | QBI deduction, when enabled and under the income ceiling |
//! | 9    | Federal taxable income = line 7 − line 8 |
//! | 10   | Ordinary tax from the federal schedule plus flat long-term gains tax |
//! | 11   | Federal tax = the larger of line 10 and the AMT |
//! | 12   | State taxable income = gross − state deductions + state add-backs |
//! | 13   | State tax from the jurisdiction's schedule |
//! | 14   | Totals and rendered insights |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{ClientFinancialProfile, EnabledStrategySet, Jurisdiction, TaxEngine, TaxTables};
//!
//! let profile = ClientFinancialProfile {
//!     w2_income: dec!(100000),
//!     jurisdiction: Jurisdiction::Pennsylvania,
//!     ..Default::default()
//! };
//!
//! let engine = TaxEngine::new(TaxTables::shared());
//! let result = engine
//!     .calculate_year(&profile, &EnabledStrategySet::baseline())
//!     .unwrap();
//!
//! assert_eq!(result.fed_tax, dec!(13614.00));
//! assert_eq!(result.state_tax, dec!(3070.00));
//! assert_eq!(result.total_tax, dec!(16684.00));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::brackets::bracket_tax;
use crate::calculations::common::{max, non_negative, round_half_up};
use crate::calculations::insights;
use crate::calculations::strategies::{Strategy, StrategyPipeline};
use crate::config::TaxTables;
use crate::models::{
    ClientFinancialProfile, EnabledStrategySet, StrategyBenefit, StrategyId, YearTaxResult,
};

/// Errors raised while computing a year.
///
/// Bad numbers never error; they are clamped. Only configuration lookups
/// that cannot be answered, and projections grown past what `Decimal` can
/// hold, are reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxEngineError {
    /// The profile names an exposure level the tables do not define.
    #[error("unknown exposure level '{0}'")]
    UnknownExposureLevel(String),

    /// Loss harvesting is enabled but the profile names no exposure level.
    #[error("capital loss harvesting requires an exposure level")]
    MissingExposureLevel,

    /// Compounded income or running totals no longer fit in a `Decimal`.
    #[error("projected amounts overflow in year {year}")]
    ProjectionOverflow { year: u32 },
}

/// Computes one year of federal and state tax against a set of tables.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    tables: &'a TaxTables,
}

impl<'a> TaxEngine<'a> {
    pub fn new(tables: &'a TaxTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'a TaxTables {
        self.tables
    }

    /// Computes the year's liability for `profile` with `enabled` strategies.
    ///
    /// An empty set yields the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError`] when loss harvesting is enabled and the
    /// exposure level is missing or unknown.
    pub fn calculate_year(
        &self,
        profile: &ClientFinancialProfile,
        enabled: &EnabledStrategySet,
    ) -> Result<YearTaxResult, TaxEngineError> {
        let profile = profile.sanitized();
        let ctx = StrategyContext::new(&profile, self.tables);
        let acc = StrategyPipeline::run(&ctx, enabled)?;

        let ordinary_income = self.ordinary_income(&profile, &acc);
        let agi = self.adjusted_gross_income(ordinary_income, acc.above_agi);
        let amt_tax = self.alternative_minimum_tax(agi);

        let taxable_before_qbi = self.taxable_before_qbi(agi, acc.below_agi);
        let acc = if enabled.is_enabled(StrategyId::QualifiedBusinessIncome) {
            Strategy::QualifiedBusinessIncome.apply(&ctx, taxable_before_qbi, acc)?
        } else {
            acc
        };
        let taxable_income = non_negative(taxable_before_qbi - acc.qbi_deduction);

        let ordinary_tax = bracket_tax(taxable_income, &self.tables.federal_brackets);
        let capital_gains_tax = self.capital_gains_tax(acc.long_term_gains);
        let fed_tax = max(ordinary_tax + capital_gains_tax, amt_tax);

        let state_taxable_income = self.state_taxable_income(&profile, &acc);
        let state_tax = bracket_tax(state_taxable_income, &ctx.rules().brackets);

        let total_tax = fed_tax + state_tax;
        debug!(
            %agi,
            %taxable_income,
            %ordinary_tax,
            %capital_gains_tax,
            %amt_tax,
            %state_taxable_income,
            %total_tax,
            "year calculated"
        );

        let insights = insights::render(&acc.deltas, profile.jurisdiction);
        Ok(YearTaxResult {
            total_tax,
            fed_tax,
            state_tax,
            marginal_rate: self.tables.federal_brackets.marginal_rate(taxable_income),
            capital_allocated: acc.capital_allocated,
            after_tax_income: profile.gross_income() - total_tax,
            deltas: acc.deltas,
            insights,
        })
    }

    /// Savings each enabled strategy produces when run alone.
    ///
    /// Each strategy is evaluated alone against the baseline, so the rows
    /// do not sum to the combined savings when strategies interact.
    ///
    /// # Errors
    ///
    /// Same as [`calculate_year`](Self::calculate_year).
    pub fn strategy_benefits(
        &self,
        profile: &ClientFinancialProfile,
        enabled: &EnabledStrategySet,
    ) -> Result<Vec<StrategyBenefit>, TaxEngineError> {
        let baseline = self.calculate_year(profile, &EnabledStrategySet::baseline())?;

        enabled
            .enabled_definitions()
            .map(|definition| {
                let alone = EnabledStrategySet::baseline().with(definition.id);
                let result = self.calculate_year(profile, &alone)?;
                Ok(StrategyBenefit {
                    strategy: definition.id,
                    capital_allocated: result.capital_allocated,
                    fed_savings: baseline.fed_tax - result.fed_tax,
                    state_savings: baseline.state_tax - result.state_tax,
                    tax_savings: baseline.total_tax - result.total_tax,
                })
            })
            .collect()
    }

    /// Wages, business income and whatever short-term gains survived harvesting.
    fn ordinary_income(
        &self,
        profile: &ClientFinancialProfile,
        acc: &Accumulator,
    ) -> Decimal {
        profile.w2_income + profile.business_income + acc.short_term_gains
    }

    fn adjusted_gross_income(
        &self,
        ordinary_income: Decimal,
        above_agi: Decimal,
    ) -> Decimal {
        non_negative(ordinary_income - above_agi)
    }

    /// AMT with AMTI taken as AGI; no preference items are added back.
    fn alternative_minimum_tax(
        &self,
        amti: Decimal,
    ) -> Decimal {
        let federal = &self.tables.federal;
        let phaseout = non_negative(amti - federal.amt_phaseout_start) * federal.amt_phaseout_rate;
        let exemption = non_negative(federal.amt_exemption - phaseout);
        let amt_taxable = non_negative(amti - exemption);
        bracket_tax(amt_taxable, &self.tables.amt_brackets)
    }

    fn taxable_before_qbi(
        &self,
        agi: Decimal,
        below_agi: Decimal,
    ) -> Decimal {
        non_negative(agi - self.tables.federal.standard_deduction - below_agi)
    }

    fn capital_gains_tax(
        &self,
        long_term_gains: Decimal,
    ) -> Decimal {
        round_half_up(non_negative(long_term_gains) * self.tables.federal.long_term_capital_gains_rate)
    }

    fn state_taxable_income(
        &self,
        profile: &ClientFinancialProfile,
        acc: &Accumulator,
    ) -> Decimal {
        non_negative(
            profile.w2_income + profile.business_income + acc.long_term_gains + acc.short_term_gains
                - acc.state_deduction_total
                + acc.state_add_back,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{InsightKind, Jurisdiction, ReasonCode, StrategyInputs};

    fn engine() -> TaxEngine<'static> {
        TaxEngine::new(TaxTables::shared())
    }

    fn business_owner(jurisdiction: Jurisdiction) -> ClientFinancialProfile {
        ClientFinancialProfile {
            w2_income: dec!(150000),
            business_income: dec!(250000),
            short_term_gains: dec!(20000),
            long_term_gains: dec!(30000),
            jurisdiction,
            exposure_level: Some("145/45".to_string()),
            inputs: StrategyInputs {
                harvest_investment: dec!(100000),
                equipment_cost: dec!(80000),
                employee_deferral: dec!(23500),
                profit_share_contribution: dec!(40000),
                charitable_amount: dec!(25000),
                energy_investment: dec!(50000),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // =========================================================================
    // Step helper tests
    // =========================================================================

    #[test]
    fn adjusted_gross_income_floors_at_zero() {
        assert_eq!(engine().adjusted_gross_income(dec!(10000), dec!(25000)), dec!(0));
        assert_eq!(engine().adjusted_gross_income(dec!(100000), dec!(25000)), dec!(75000));
    }

    #[test]
    fn amt_below_exemption_is_zero() {
        assert_eq!(engine().alternative_minimum_tax(dec!(80000)), dec!(0));
    }

    #[test]
    fn amt_without_phaseout() {
        // (200,000 − 88,100) × 26%
        assert_eq!(engine().alternative_minimum_tax(dec!(200000)), dec!(29094.00));
    }

    #[test]
    fn amt_exemption_fully_phased_out() {
        // exemption gone above 626,350 + 4 × 88,100
        let amti = dec!(1000000);
        let expected = round_half_up(dec!(239100) * dec!(0.26) + (amti - dec!(239100)) * dec!(0.28));
        assert_eq!(engine().alternative_minimum_tax(amti), expected);
    }

    #[test]
    fn taxable_before_qbi_subtracts_standard_and_below_agi() {
        assert_eq!(engine().taxable_before_qbi(dec!(100000), dec!(5000)), dec!(80000));
        assert_eq!(engine().taxable_before_qbi(dec!(10000), dec!(0)), dec!(0));
    }

    #[test]
    fn capital_gains_tax_is_flat() {
        assert_eq!(engine().capital_gains_tax(dec!(30000)), dec!(6000.00));
        assert_eq!(engine().capital_gains_tax(dec!(0)), dec!(0));
    }

    #[test]
    fn state_taxable_income_includes_add_back() {
        let profile = business_owner(Jurisdiction::Pennsylvania);
        let acc = Accumulator {
            short_term_gains: dec!(0),
            long_term_gains: dec!(10000),
            state_deduction_total: dec!(50000),
            state_add_back: dec!(20000),
            ..Default::default()
        };

        assert_eq!(engine().state_taxable_income(&profile, &acc), dec!(380000));
    }

    // =========================================================================
    // calculate_year tests
    // =========================================================================

    #[test]
    fn baseline_wage_earner() {
        let profile = ClientFinancialProfile {
            w2_income: dec!(100000),
            ..Default::default()
        };

        let result = engine()
            .calculate_year(&profile, &EnabledStrategySet::baseline())
            .unwrap();

        assert_eq!(result.fed_tax, dec!(13614.00));
        assert_eq!(result.marginal_rate, dec!(0.22));
        assert_eq!(result.capital_allocated, dec!(0));
        assert_eq!(result.after_tax_income, dec!(100000) - result.total_tax);
        assert!(result.deltas.is_empty());
    }

    #[test]
    fn zero_income_owes_nothing() {
        let result = engine()
            .calculate_year(&ClientFinancialProfile::default(), &EnabledStrategySet::baseline())
            .unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.effective_rate(), dec!(0));
    }

    #[test]
    fn negative_inputs_are_treated_as_zero() {
        let profile = ClientFinancialProfile {
            w2_income: dec!(-50000),
            business_income: dec!(-1),
            ..Default::default()
        };

        let result = engine()
            .calculate_year(&profile, &EnabledStrategySet::baseline())
            .unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.after_tax_income, dec!(0));
    }

    #[test]
    fn amt_is_a_floor_not_an_addition() {
        // below-AGI deductions lower regular tax but not AMTI
        let profile = ClientFinancialProfile {
            w2_income: dec!(500000),
            inputs: StrategyInputs {
                production_investment: dec!(400000),
                ..Default::default()
            },
            ..Default::default()
        };
        let enabled = EnabledStrategySet::baseline().with(StrategyId::ProductionFinancing);

        let result = engine().calculate_year(&profile, &enabled).unwrap();

        // regular tax on 85,000 is 13,614; AMT on 411,900 is 110,550
        assert_eq!(result.fed_tax, dec!(110550.00));
    }

    #[test]
    fn long_term_gains_taxed_at_flat_rate_outside_agi() {
        let profile = ClientFinancialProfile {
            long_term_gains: dec!(400000),
            ..Default::default()
        };

        let result = engine()
            .calculate_year(&profile, &EnabledStrategySet::baseline())
            .unwrap();

        assert_eq!(result.fed_tax, dec!(80000.00));
    }

    #[test]
    fn qbi_is_only_applied_when_enabled() {
        let profile = ClientFinancialProfile {
            business_income: dec!(120000),
            ..Default::default()
        };

        let baseline = engine()
            .calculate_year(&profile, &EnabledStrategySet::baseline())
            .unwrap();
        let with_qbi = engine()
            .calculate_year(
                &profile,
                &EnabledStrategySet::baseline().with(StrategyId::QualifiedBusinessIncome),
            )
            .unwrap();

        assert!(with_qbi.fed_tax < baseline.fed_tax);
        assert_eq!(with_qbi.state_tax, baseline.state_tax);
        assert_eq!(with_qbi.deltas[0].reason, ReasonCode::QbiDeduction);
        // 20% of 105,000 taxable income
        assert_eq!(with_qbi.deltas[0].amount, dec!(21000.00));
    }

    #[test]
    fn qbi_ceiling_produces_warning_insight() {
        let profile = business_owner(Jurisdiction::NewYork);

        let result = engine()
            .calculate_year(
                &profile,
                &EnabledStrategySet::baseline().with(StrategyId::QualifiedBusinessIncome),
            )
            .unwrap();

        let last = result.insights.last().unwrap();
        assert_eq!(last.kind, InsightKind::Warning);
        assert_eq!(last.strategy, StrategyId::QualifiedBusinessIncome);
    }

    #[test]
    fn insights_mirror_deltas() {
        let profile = business_owner(Jurisdiction::Pennsylvania);

        let result = engine()
            .calculate_year(&profile, &EnabledStrategySet::all())
            .unwrap();

        assert_eq!(result.insights.len(), result.deltas.len());
        for (insight, delta) in result.insights.iter().zip(&result.deltas) {
            assert_eq!(insight.kind, delta.kind);
            assert_eq!(insight.strategy, delta.strategy);
        }
    }

    #[test]
    fn capital_allocated_counts_enabled_inputs() {
        let profile = business_owner(Jurisdiction::NewYork);

        let result = engine()
            .calculate_year(&profile, &EnabledStrategySet::all())
            .unwrap();

        // 100,000 + 80,000 + 23,500 + 40,000 + 25,000 + 50,000
        assert_eq!(result.capital_allocated, dec!(318500));
    }

    #[test]
    fn unknown_exposure_level_is_an_error() {
        let mut profile = business_owner(Jurisdiction::NewYork);
        profile.exposure_level = Some("1000/900".to_string());

        let result = engine().calculate_year(&profile, &EnabledStrategySet::all());

        assert_eq!(
            result,
            Err(TaxEngineError::UnknownExposureLevel("1000/900".to_string()))
        );
    }

    #[test]
    fn exposure_level_not_needed_without_harvesting() {
        let mut profile = business_owner(Jurisdiction::NewYork);
        profile.exposure_level = None;
        let enabled = EnabledStrategySet::baseline().with(StrategyId::EquipmentExpensing);

        assert!(engine().calculate_year(&profile, &enabled).is_ok());
    }

    // =========================================================================
    // strategy_benefits tests
    // =========================================================================

    #[test]
    fn strategy_benefits_one_row_per_enabled_strategy() {
        let profile = business_owner(Jurisdiction::NewYork);
        let enabled = EnabledStrategySet::baseline()
            .with(StrategyId::EquipmentExpensing)
            .with(StrategyId::CharitableStructure);

        let benefits = engine().strategy_benefits(&profile, &enabled).unwrap();

        assert_eq!(benefits.len(), 2);
        assert_eq!(benefits[0].strategy, StrategyId::EquipmentExpensing);
        assert_eq!(benefits[0].capital_allocated, dec!(80000));
        assert!(benefits[0].tax_savings > dec!(0));
        assert_eq!(
            benefits[1].tax_savings,
            benefits[1].fed_savings + benefits[1].state_savings
        );
    }

    #[test]
    fn strategy_benefits_reflect_state_disallowance() {
        let profile = business_owner(Jurisdiction::Pennsylvania);
        let enabled = EnabledStrategySet::baseline().with(StrategyId::EnergyInvestment);

        let benefits = engine().strategy_benefits(&profile, &enabled).unwrap();

        assert_eq!(benefits[0].state_savings, dec!(0));
        assert!(benefits[0].fed_savings > dec!(0));
    }
}
