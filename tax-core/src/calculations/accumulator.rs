use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{FederalParameters, JurisdictionRules, TaxTables};
use crate::models::{ClientFinancialProfile, StrategyDelta};

/// Running totals threaded through the strategy pipeline for one year.
///
/// Each processor takes the accumulator by value and returns the updated
/// copy, so the order of effects is exactly the order of the fold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    /// Deductions taken before AGI.
    pub above_agi: Decimal,
    /// Deductions taken after AGI, alongside the standard deduction.
    pub below_agi: Decimal,
    /// Business income still eligible for the QBI deduction.
    pub qbi_base_income: Decimal,
    /// Set once taxable income is known; zero until then.
    pub qbi_deduction: Decimal,
    pub short_term_gains: Decimal,
    pub long_term_gains: Decimal,
    pub state_deduction_total: Decimal,
    pub state_add_back: Decimal,
    pub capital_allocated: Decimal,
    pub deltas: Vec<StrategyDelta>,
}

impl Accumulator {
    /// Starting point for a year: no deductions, gains and QBI base taken
    /// straight from the profile.
    pub fn for_profile(profile: &ClientFinancialProfile) -> Self {
        Self {
            qbi_base_income: profile.business_income,
            short_term_gains: profile.short_term_gains,
            long_term_gains: profile.long_term_gains,
            ..Self::default()
        }
    }

    pub(crate) fn record(
        &mut self,
        delta: StrategyDelta,
    ) {
        self.deltas.push(delta);
    }
}

/// Read-only inputs every processor sees.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub profile: &'a ClientFinancialProfile,
    pub tables: &'a TaxTables,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        profile: &'a ClientFinancialProfile,
        tables: &'a TaxTables,
    ) -> Self {
        Self { profile, tables }
    }

    pub fn federal(&self) -> &'a FederalParameters {
        &self.tables.federal
    }

    pub fn rules(&self) -> &'a JurisdictionRules {
        self.tables.jurisdiction(self.profile.jurisdiction)
    }
}
