mod client_profile;
mod insight;
mod strategy;
mod tax_bracket;
mod tax_result;

pub use client_profile::{ClientFinancialProfile, InputField, Jurisdiction, StrategyInputs};
pub use insight::{Insight, InsightKind, ReasonCode, StrategyDelta};
pub use strategy::{
    EnabledStrategySet, STRATEGY_CATALOG, StrategyCategory, StrategyDefinition, StrategyId,
    StrategyKind,
};
pub use tax_bracket::{BracketTable, BracketTableError, TaxBracket};
pub use tax_result::{ProjectionResult, ProjectionYear, StrategyBenefit, YearTaxResult};
