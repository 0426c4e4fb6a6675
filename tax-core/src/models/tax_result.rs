use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Insight, StrategyDelta, StrategyId};
use crate::calculations::common::round_half_up;

/// Tax liability for one year under one enabled-strategy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTaxResult {
    pub total_tax: Decimal,
    pub fed_tax: Decimal,
    pub state_tax: Decimal,
    /// Federal ordinary rate on the next dollar of taxable income.
    pub marginal_rate: Decimal,
    pub capital_allocated: Decimal,
    pub after_tax_income: Decimal,
    pub deltas: Vec<StrategyDelta>,
    pub insights: Vec<Insight>,
}

impl YearTaxResult {
    /// Total tax as a share of gross income; zero when there is no income.
    pub fn effective_rate(&self) -> Decimal {
        let gross = self.after_tax_income + self.total_tax;
        if gross <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.total_tax / gross).round_dp(4)
    }
}

/// One projected year: the baseline next to the optimized result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionYear {
    /// 1-based position in the projection.
    pub year_index: u32,
    pub tax_year: Option<i32>,
    pub baseline: YearTaxResult,
    pub with_strategies: YearTaxResult,
    pub cumulative_savings: Decimal,
}

impl ProjectionYear {
    pub fn annual_savings(&self) -> Decimal {
        round_half_up(self.baseline.total_tax - self.with_strategies.total_tax)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub years: Vec<ProjectionYear>,
    pub cumulative_baseline_tax: Decimal,
    pub cumulative_optimized_tax: Decimal,
    pub cumulative_savings: Decimal,

    /// Capital committed in the first year; elections are not compounded.
    pub capital_allocated: Decimal,
}

/// Tax saved by one strategy run on its own against the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyBenefit {
    pub strategy: StrategyId,
    pub capital_allocated: Decimal,
    pub fed_savings: Decimal,
    pub state_savings: Decimal,
    pub tax_savings: Decimal,
}
