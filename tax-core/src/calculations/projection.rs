//! Multi-year projection of baseline versus optimized tax.
//!
//! Income grows by `growth_rate` percent per year; strategy inputs are
//! annual elections and stay at their entered amounts.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculations::engine::{TaxEngine, TaxEngineError};
use crate::models::{ClientFinancialProfile, EnabledStrategySet, ProjectionResult, ProjectionYear};

#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine<'a> {
    engine: TaxEngine<'a>,
}

impl<'a> ProjectionEngine<'a> {
    pub fn new(engine: TaxEngine<'a>) -> Self {
        Self { engine }
    }

    /// Projects `max(1, projection_years)` years.
    ///
    /// # Errors
    ///
    /// Fails on the first year whose calculation fails, or with
    /// [`TaxEngineError::ProjectionOverflow`] once compounded income or the
    /// running totals exceed what a `Decimal` can hold.
    pub fn project(
        &self,
        profile: &ClientFinancialProfile,
        enabled: &EnabledStrategySet,
    ) -> Result<ProjectionResult, TaxEngineError> {
        let profile = profile.sanitized();
        let loop_years = profile.projection_years.max(1);
        let growth = Decimal::ONE + profile.growth_rate / Decimal::ONE_HUNDRED;
        let baseline_set = EnabledStrategySet::baseline();

        let mut years = Vec::new();
        let mut cumulative_baseline_tax = Decimal::ZERO;
        let mut cumulative_optimized_tax = Decimal::ZERO;
        let mut growth_factor = Decimal::ONE;

        for i in 0..loop_years {
            let year_index = i + 1;
            let overflow = TaxEngineError::ProjectionOverflow { year: year_index };
            if i > 0 {
                growth_factor = growth_factor.checked_mul(growth).ok_or_else(|| overflow.clone())?;
            }
            let year_profile = profile
                .with_income_scaled(growth_factor)
                .ok_or_else(|| overflow.clone())?;

            let baseline = self.engine.calculate_year(&year_profile, &baseline_set)?;
            let with_strategies = if enabled.is_baseline() {
                baseline.clone()
            } else {
                self.engine.calculate_year(&year_profile, enabled)?
            };

            cumulative_baseline_tax = cumulative_baseline_tax
                .checked_add(baseline.total_tax)
                .ok_or_else(|| overflow.clone())?;
            cumulative_optimized_tax = cumulative_optimized_tax
                .checked_add(with_strategies.total_tax)
                .ok_or(overflow)?;
            let cumulative_savings = cumulative_baseline_tax - cumulative_optimized_tax;
            debug!(
                year = year_index,
                %growth_factor,
                baseline_tax = %baseline.total_tax,
                optimized_tax = %with_strategies.total_tax,
                "projected year"
            );

            years.push(ProjectionYear {
                year_index,
                tax_year: profile
                    .base_tax_year
                    .and_then(|base| base.checked_add(i32::try_from(i).ok()?)),
                baseline,
                with_strategies,
                cumulative_savings,
            });
        }

        let capital_allocated = years
            .first()
            .map(|year| year.with_strategies.capital_allocated)
            .unwrap_or(Decimal::ZERO);
        let cumulative_savings = cumulative_baseline_tax - cumulative_optimized_tax;
        info!(
            years = loop_years,
            %cumulative_savings,
            %capital_allocated,
            "projection complete"
        );

        Ok(ProjectionResult {
            years,
            cumulative_baseline_tax,
            cumulative_optimized_tax,
            cumulative_savings,
            capital_allocated,
        })
    }
}
