//! Parallel evaluation of independent client scenarios.
//!
//! Every scenario is its own unit of work: the tables are shared read-only
//! and nothing else crosses between scenarios, so no locking is needed.
//! Outcomes come back in input order, each with its own `Result`.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculations::engine::{TaxEngine, TaxEngineError};
use crate::calculations::projection::ProjectionEngine;
use crate::config::TaxTables;
use crate::models::{ClientFinancialProfile, EnabledStrategySet, ProjectionResult, StrategyBenefit};

/// One client profile with the strategies to evaluate for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub profile: ClientFinancialProfile,
    #[serde(default)]
    pub strategies: EnabledStrategySet,
}

/// Everything computed for one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRun {
    pub projection: ProjectionResult,
    /// First-year savings of each enabled strategy on its own.
    pub benefits: Vec<StrategyBenefit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<ScenarioRun, TaxEngineError>,
}

impl ScenarioOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Projects one scenario and breaks down its strategy benefits.
pub fn run_scenario(
    tables: &TaxTables,
    scenario: &Scenario,
) -> ScenarioOutcome {
    let engine = TaxEngine::new(tables);
    let result = ProjectionEngine::new(engine)
        .project(&scenario.profile, &scenario.strategies)
        .and_then(|projection| {
            let benefits = engine.strategy_benefits(&scenario.profile, &scenario.strategies)?;
            Ok(ScenarioRun {
                projection,
                benefits,
            })
        });
    if let Err(err) = &result {
        warn!(scenario = %scenario.name, error = %err, "scenario failed");
    }
    ScenarioOutcome {
        name: scenario.name.clone(),
        result,
    }
}

/// Runs every scenario in parallel, one [`run_scenario`] per unit of work.
pub fn run_batch(
    tables: &TaxTables,
    scenarios: &[Scenario],
) -> Vec<ScenarioOutcome> {
    let start = Instant::now();

    let outcomes: Vec<ScenarioOutcome> = scenarios
        .par_iter()
        .map(|scenario| run_scenario(tables, scenario))
        .collect();

    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
    info!(
        scenarios = outcomes.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch complete"
    );
    outcomes
}
