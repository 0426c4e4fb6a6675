//! Tax planning calculations.
//!
//! The bracket calculator and strategy processors are pure functions; the
//! [`TaxEngine`] composes them into one year and the [`ProjectionEngine`]
//! repeats that over several years of growing income.

mod accumulator;
pub mod batch;
mod brackets;
pub mod common;
mod engine;
pub mod insights;
mod projection;
pub mod strategies;

pub use accumulator::{Accumulator, StrategyContext};
pub use batch::{Scenario, ScenarioOutcome, ScenarioRun, run_batch};
pub use brackets::{bracket_tax, tax_over_brackets};
pub use engine::{TaxEngine, TaxEngineError};
pub use projection::ProjectionEngine;
pub use strategies::{Strategy, StrategyPipeline};
