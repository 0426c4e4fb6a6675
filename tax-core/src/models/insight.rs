use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StrategyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Success,
    Warning,
}

/// What a strategy did to the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    ShortTermGainsOffset,
    LongTermGainsOffset,
    LongTermGainGenerated,
    OrdinaryIncomeOffset,
    ExcessLossCarriedForward,
    FederalDeduction,
    FederalDeductionCapped,
    StateDeduction,
    StateAddBack,
    StateDeductionDisallowed,
    QbiDeduction,
    QbiIncomeCeilingExceeded,
}

/// A structured record of one effect a strategy had on the accumulator.
///
/// The numeric core only produces these; prose is rendered separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDelta {
    pub strategy: StrategyId,
    pub kind: InsightKind,
    pub reason: ReasonCode,
    pub amount: Decimal,
}

impl StrategyDelta {
    pub fn success(
        strategy: StrategyId,
        reason: ReasonCode,
        amount: Decimal,
    ) -> Self {
        Self {
            strategy,
            kind: InsightKind::Success,
            reason,
            amount,
        }
    }

    pub fn warning(
        strategy: StrategyId,
        reason: ReasonCode,
        amount: Decimal,
    ) -> Self {
        Self {
            strategy,
            kind: InsightKind::Warning,
            reason,
            amount,
        }
    }
}

/// A delta rendered for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub strategy: StrategyId,
    pub kind: InsightKind,
    pub text: String,
}
