use std::path::Path;

use anyhow::{Context, Result, bail};
use tax_core::TaxTables;
use tax_core::calculations::batch::run_scenario;
use tax_core::calculations::{Scenario, run_batch};
use tax_data::{BracketScheduleLoader, load_tables_from_file};
use tracing::info;

use crate::report::{BatchReport, FailedScenario, ScenarioReport};

/// Built-in tables, optionally replaced by a TOML file and then patched with
/// a bracket schedule CSV.
pub fn load_tables(
    tables: Option<&Path>,
    brackets: Option<&Path>,
) -> Result<TaxTables> {
    let mut loaded = match tables {
        Some(path) => load_tables_from_file(path)
            .with_context(|| format!("failed to load tax tables from '{}'", path.display()))?,
        None => TaxTables::default_2025(),
    };

    if let Some(path) = brackets {
        let count = BracketScheduleLoader::load_into(&mut loaded, path)
            .with_context(|| format!("failed to load bracket schedules from '{}'", path.display()))?;
        loaded
            .validate()
            .with_context(|| format!("bracket schedules in '{}' are inconsistent", path.display()))?;
        info!(schedules = count, path = %path.display(), "bracket schedules applied");
    }

    Ok(loaded)
}

/// Fills in the first projected calendar year where the scenario left it blank.
pub fn apply_default_year(
    scenarios: &mut [Scenario],
    year: i32,
) {
    for scenario in scenarios {
        scenario.profile.base_tax_year.get_or_insert(year);
    }
}

/// One scenario as a single unit of work, the same one a batch runs.
pub fn build_report(
    tables: &TaxTables,
    scenario: &Scenario,
) -> Result<ScenarioReport> {
    let run = run_scenario(tables, scenario)
        .result
        .with_context(|| format!("scenario '{}' failed", scenario.name))?;

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        projection: run.projection,
        benefits: run.benefits,
    })
}

/// Runs every scenario through [`run_batch`]. With `fail_fast` the first
/// failure in input order aborts the whole batch; otherwise failures are
/// collected next to the successful reports.
pub fn build_batch_report(
    tables: &TaxTables,
    scenarios: &[Scenario],
    fail_fast: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for outcome in run_batch(tables, scenarios) {
        let name = outcome.name;
        let computed = outcome.result.map(|run| ScenarioReport {
            name: name.clone(),
            projection: run.projection,
            benefits: run.benefits,
        });

        match computed {
            Ok(scenario_report) => report.scenarios.push(scenario_report),
            Err(err) if fail_fast => bail!("scenario '{name}' failed: {err}"),
            Err(err) => report.failures.push(FailedScenario {
                name,
                error: err.to_string(),
            }),
        }
    }

    Ok(report)
}
