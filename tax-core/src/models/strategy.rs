use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::InputField;

/// Identifier of a strategy in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    CapitalLossHarvesting,
    EquipmentExpensing,
    EmployeeDeferral,
    EmployerProfitShare,
    DefinedBenefit,
    CharitableStructure,
    EnergyInvestment,
    ProductionFinancing,
    QualifiedBusinessIncome,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CapitalLossHarvesting => "capital_loss_harvesting",
            Self::EquipmentExpensing => "equipment_expensing",
            Self::EmployeeDeferral => "employee_deferral",
            Self::EmployerProfitShare => "employer_profit_share",
            Self::DefinedBenefit => "defined_benefit",
            Self::CharitableStructure => "charitable_structure",
            Self::EnergyInvestment => "energy_investment",
            Self::ProductionFinancing => "production_financing",
            Self::QualifiedBusinessIncome => "qualified_business_income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        STRATEGY_CATALOG
            .iter()
            .map(|definition| definition.id)
            .find(|id| id.as_str() == s)
    }

    pub fn definition(&self) -> &'static StrategyDefinition {
        // The catalog holds exactly one entry per variant, in declaration order.
        &STRATEGY_CATALOG[*self as usize]
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyCategory {
    CapitalGains,
    BusinessInvestment,
    Retirement,
    Charitable,
    AlternativeInvestment,
    BusinessIncome,
}

/// Where a strategy's deduction lands in the federal computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    AboveAgi,
    BelowAgi,
    Capital,
    Qbi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyDefinition {
    pub id: StrategyId,
    pub name: &'static str,
    pub category: StrategyCategory,
    pub input_required: Option<InputField>,
    pub kind: StrategyKind,
}

/// Every strategy the engine knows, in the order the pipeline runs them.
///
/// Charitable must follow the above-AGI strategies because its limit reads
/// the above-AGI total; QBI is last because it reads the final QBI base.
pub static STRATEGY_CATALOG: [StrategyDefinition; 9] = [
    StrategyDefinition {
        id: StrategyId::CapitalLossHarvesting,
        name: "Capital loss harvesting",
        category: StrategyCategory::CapitalGains,
        input_required: Some(InputField::HarvestInvestment),
        kind: StrategyKind::Capital,
    },
    StrategyDefinition {
        id: StrategyId::EquipmentExpensing,
        name: "Equipment expensing",
        category: StrategyCategory::BusinessInvestment,
        input_required: Some(InputField::EquipmentCost),
        kind: StrategyKind::AboveAgi,
    },
    StrategyDefinition {
        id: StrategyId::EmployeeDeferral,
        name: "Employee salary deferral",
        category: StrategyCategory::Retirement,
        input_required: Some(InputField::EmployeeDeferral),
        kind: StrategyKind::AboveAgi,
    },
    StrategyDefinition {
        id: StrategyId::EmployerProfitShare,
        name: "Employer profit-sharing contribution",
        category: StrategyCategory::Retirement,
        input_required: Some(InputField::ProfitShareContribution),
        kind: StrategyKind::AboveAgi,
    },
    StrategyDefinition {
        id: StrategyId::DefinedBenefit,
        name: "Executive defined-benefit plan",
        category: StrategyCategory::Retirement,
        input_required: Some(InputField::DefinedBenefitContribution),
        kind: StrategyKind::AboveAgi,
    },
    StrategyDefinition {
        id: StrategyId::CharitableStructure,
        name: "Charitable giving structure",
        category: StrategyCategory::Charitable,
        input_required: Some(InputField::CharitableAmount),
        kind: StrategyKind::BelowAgi,
    },
    StrategyDefinition {
        id: StrategyId::EnergyInvestment,
        name: "Energy investment",
        category: StrategyCategory::AlternativeInvestment,
        input_required: Some(InputField::EnergyInvestment),
        kind: StrategyKind::BelowAgi,
    },
    StrategyDefinition {
        id: StrategyId::ProductionFinancing,
        name: "Film and production financing",
        category: StrategyCategory::AlternativeInvestment,
        input_required: Some(InputField::ProductionInvestment),
        kind: StrategyKind::BelowAgi,
    },
    StrategyDefinition {
        id: StrategyId::QualifiedBusinessIncome,
        name: "Qualified business income deduction",
        category: StrategyCategory::BusinessIncome,
        input_required: None,
        kind: StrategyKind::Qbi,
    },
];

/// Which strategies a scenario turns on. The empty set is the baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledStrategySet {
    flags: BTreeMap<StrategyId, bool>,
}

impl EnabledStrategySet {
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Every strategy in the catalog switched on.
    pub fn all() -> Self {
        STRATEGY_CATALOG.iter().map(|d| d.id).collect()
    }

    pub fn set(
        &mut self,
        id: StrategyId,
        enabled: bool,
    ) {
        self.flags.insert(id, enabled);
    }

    pub fn with(
        mut self,
        id: StrategyId,
    ) -> Self {
        self.set(id, true);
        self
    }

    pub fn is_enabled(
        &self,
        id: StrategyId,
    ) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Enabled strategy definitions in catalog order.
    pub fn enabled_definitions(&self) -> impl Iterator<Item = &'static StrategyDefinition> + '_ {
        STRATEGY_CATALOG.iter().filter(|d| self.is_enabled(d.id))
    }

    pub fn is_baseline(&self) -> bool {
        !self.flags.values().any(|enabled| *enabled)
    }
}

impl FromIterator<StrategyId> for EnabledStrategySet {
    fn from_iter<I: IntoIterator<Item = StrategyId>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(|id| (id, true)).collect(),
        }
    }
}
