use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, round_half_up};

/// State whose income tax rules apply to the client.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Jurisdiction {
    #[default]
    #[serde(rename = "NY")]
    NewYork,
    #[serde(rename = "PA")]
    Pennsylvania,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 2] = [Self::NewYork, Self::Pennsylvania];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewYork => "NY",
            Self::Pennsylvania => "PA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NY" => Some(Self::NewYork),
            "PA" => Some(Self::Pennsylvania),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NewYork => "New York",
            Self::Pennsylvania => "Pennsylvania",
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Profile field that holds the dollar amount a strategy acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    HarvestInvestment,
    EquipmentCost,
    EmployeeDeferral,
    ProfitShareContribution,
    DefinedBenefitContribution,
    CharitableAmount,
    EnergyInvestment,
    ProductionInvestment,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HarvestInvestment => "harvest_investment",
            Self::EquipmentCost => "equipment_cost",
            Self::EmployeeDeferral => "employee_deferral",
            Self::ProfitShareContribution => "profit_share_contribution",
            Self::DefinedBenefitContribution => "defined_benefit_contribution",
            Self::CharitableAmount => "charitable_amount",
            Self::EnergyInvestment => "energy_investment",
            Self::ProductionInvestment => "production_investment",
        }
    }
}

/// Annual election amounts, one per strategy that needs a dollar input.
///
/// These are fixed elections: the projection never grows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyInputs {
    pub harvest_investment: Decimal,
    pub equipment_cost: Decimal,
    pub employee_deferral: Decimal,
    pub profit_share_contribution: Decimal,
    pub defined_benefit_contribution: Decimal,
    pub charitable_amount: Decimal,
    pub energy_investment: Decimal,
    pub production_investment: Decimal,
}

impl StrategyInputs {
    pub fn amount(
        &self,
        field: InputField,
    ) -> Decimal {
        match field {
            InputField::HarvestInvestment => self.harvest_investment,
            InputField::EquipmentCost => self.equipment_cost,
            InputField::EmployeeDeferral => self.employee_deferral,
            InputField::ProfitShareContribution => self.profit_share_contribution,
            InputField::DefinedBenefitContribution => self.defined_benefit_contribution,
            InputField::CharitableAmount => self.charitable_amount,
            InputField::EnergyInvestment => self.energy_investment,
            InputField::ProductionInvestment => self.production_investment,
        }
    }

    fn sanitized(&self) -> Self {
        Self {
            harvest_investment: non_negative(self.harvest_investment),
            equipment_cost: non_negative(self.equipment_cost),
            employee_deferral: non_negative(self.employee_deferral),
            profit_share_contribution: non_negative(self.profit_share_contribution),
            defined_benefit_contribution: non_negative(self.defined_benefit_contribution),
            charitable_amount: non_negative(self.charitable_amount),
            energy_investment: non_negative(self.energy_investment),
            production_investment: non_negative(self.production_investment),
        }
    }
}

/// Everything the engine needs to know about a client for one scenario.
///
/// Every field has a default so partially filled input deserializes with
/// missing amounts treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientFinancialProfile {
    pub w2_income: Decimal,
    pub business_income: Decimal,
    pub short_term_gains: Decimal,
    pub long_term_gains: Decimal,
    pub jurisdiction: Jurisdiction,

    /// Annual income growth, in percent (`5` means 5 %).
    pub growth_rate: Decimal,
    pub projection_years: u32,

    /// First projected tax year; only used to label projection rows.
    pub base_tax_year: Option<i32>,

    /// Label looked up in the exposure-level table by loss harvesting.
    pub exposure_level: Option<String>,

    #[serde(flatten)]
    pub inputs: StrategyInputs,
}

impl ClientFinancialProfile {
    /// Returns a copy with every monetary field clamped to zero or above.
    pub fn sanitized(&self) -> Self {
        Self {
            w2_income: non_negative(self.w2_income),
            business_income: non_negative(self.business_income),
            short_term_gains: non_negative(self.short_term_gains),
            long_term_gains: non_negative(self.long_term_gains),
            jurisdiction: self.jurisdiction,
            growth_rate: self.growth_rate.max(-Decimal::ONE_HUNDRED),
            projection_years: self.projection_years,
            base_tax_year: self.base_tax_year,
            exposure_level: self.exposure_level.clone(),
            inputs: self.inputs.sanitized(),
        }
    }

    /// Wages plus business income plus both gain types.
    pub fn gross_income(&self) -> Decimal {
        self.w2_income + self.business_income + self.long_term_gains + self.short_term_gains
    }

    pub fn input_amount(
        &self,
        field: InputField,
    ) -> Decimal {
        self.inputs.amount(field)
    }

    /// Copy with the four income fields multiplied by `factor`.
    ///
    /// Returns `None` when a grown field, or their sum, no longer fits in a
    /// `Decimal`.
    pub fn with_income_scaled(
        &self,
        factor: Decimal,
    ) -> Option<Self> {
        let scale = |amount: Decimal| amount.checked_mul(factor).map(round_half_up);
        let scaled = Self {
            w2_income: scale(self.w2_income)?,
            business_income: scale(self.business_income)?,
            short_term_gains: scale(self.short_term_gains)?,
            long_term_gains: scale(self.long_term_gains)?,
            ..self.clone()
        };
        scaled
            .w2_income
            .checked_add(scaled.business_income)?
            .checked_add(scaled.short_term_gains)?
            .checked_add(scaled.long_term_gains)?;
        Some(scaled)
    }
}
