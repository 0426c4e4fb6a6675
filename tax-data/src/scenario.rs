//! Scenario input files.
//!
//! ## TOML
//!
//! Any number of `[[scenario]]` tables, each with a `name`, a list of
//! strategy ids and a `profile` table whose keys match
//! [`ClientFinancialProfile`] (missing amounts default to zero):
//!
//! ```toml
//! [[scenario]]
//! name = "Rivera household"
//! strategies = ["equipment_expensing", "qualified_business_income"]
//!
//! [scenario.profile]
//! w2_income = 180000
//! business_income = 95000
//! jurisdiction = "PA"
//! equipment_cost = 40000
//! ```
//!
//! ## CSV
//!
//! One client per row. Headers are matched by name; every column except
//! `name` may be omitted or left empty.
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `name` | string | required |
//! | `jurisdiction` | string | `NY` or `PA`, default `NY` |
//! | `w2_income`, `business_income`, `short_term_gains`, `long_term_gains` | decimal | |
//! | `growth_rate` | decimal | percent per year |
//! | `projection_years` | integer | |
//! | `base_tax_year` | integer | labels projection rows |
//! | `exposure_level` | string | e.g. `145/45` |
//! | `harvest_investment` … `production_investment` | decimal | strategy inputs |
//! | `strategies` | string | ids separated by `;` |

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::Scenario;
use tax_core::{ClientFinancialProfile, EnabledStrategySet, Jurisdiction, StrategyId, StrategyInputs};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScenarioLoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown strategy '{id}' in scenario '{scenario}'")]
    UnknownStrategy { id: String, scenario: String },

    #[error("unrecognised jurisdiction '{code}' on row {row}")]
    UnknownJurisdiction { code: String, row: usize },

    #[error("no scenarios found")]
    Empty,
}

// ---------------------------------------------------------------------------
// TOML
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "scenario")]
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
struct ScenarioEntry {
    name: String,
    #[serde(default)]
    strategies: Vec<String>,
    #[serde(default)]
    profile: ClientFinancialProfile,
}

/// Parses strategy ids into a set, rejecting anything not in the catalog.
pub fn parse_strategies<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    scenario: &str,
) -> Result<EnabledStrategySet, ScenarioLoadError> {
    ids.into_iter()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            StrategyId::parse(id).ok_or_else(|| ScenarioLoadError::UnknownStrategy {
                id: id.to_string(),
                scenario: scenario.to_string(),
            })
        })
        .collect()
}

pub fn load_scenarios_from_toml(input: &str) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let file: ScenarioFile = toml::from_str(input)?;
    if file.scenarios.is_empty() {
        return Err(ScenarioLoadError::Empty);
    }

    file.scenarios
        .into_iter()
        .map(|entry| {
            let strategies = parse_strategies(entry.strategies.iter().map(String::as_str), &entry.name)?;
            Ok(Scenario {
                name: entry.name,
                profile: entry.profile,
                strategies,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(default)]
    jurisdiction: Option<String>,
    #[serde(default)]
    w2_income: Option<Decimal>,
    #[serde(default)]
    business_income: Option<Decimal>,
    #[serde(default)]
    short_term_gains: Option<Decimal>,
    #[serde(default)]
    long_term_gains: Option<Decimal>,
    #[serde(default)]
    growth_rate: Option<Decimal>,
    #[serde(default)]
    projection_years: Option<u32>,
    #[serde(default)]
    base_tax_year: Option<i32>,
    #[serde(default)]
    exposure_level: Option<String>,
    #[serde(default)]
    harvest_investment: Option<Decimal>,
    #[serde(default)]
    equipment_cost: Option<Decimal>,
    #[serde(default)]
    employee_deferral: Option<Decimal>,
    #[serde(default)]
    profit_share_contribution: Option<Decimal>,
    #[serde(default)]
    defined_benefit_contribution: Option<Decimal>,
    #[serde(default)]
    charitable_amount: Option<Decimal>,
    #[serde(default)]
    energy_investment: Option<Decimal>,
    #[serde(default)]
    production_investment: Option<Decimal>,
    #[serde(default)]
    strategies: Option<String>,
}

/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<Scenario, ScenarioLoadError> {
    let jurisdiction = match row.jurisdiction.as_deref().filter(|code| !code.is_empty()) {
        None => Jurisdiction::default(),
        Some(code) => {
            Jurisdiction::parse(code).ok_or_else(|| ScenarioLoadError::UnknownJurisdiction {
                code: code.to_string(),
                row: row_number,
            })?
        }
    };
    let strategies = parse_strategies(row.strategies.as_deref().unwrap_or("").split(';'), &row.name)?;
    let amount = |value: Option<Decimal>| value.unwrap_or(Decimal::ZERO);

    Ok(Scenario {
        profile: ClientFinancialProfile {
            w2_income: amount(row.w2_income),
            business_income: amount(row.business_income),
            short_term_gains: amount(row.short_term_gains),
            long_term_gains: amount(row.long_term_gains),
            jurisdiction,
            growth_rate: amount(row.growth_rate),
            projection_years: row.projection_years.unwrap_or(0),
            base_tax_year: row.base_tax_year,
            exposure_level: row.exposure_level.filter(|level| !level.is_empty()),
            inputs: StrategyInputs {
                harvest_investment: amount(row.harvest_investment),
                equipment_cost: amount(row.equipment_cost),
                employee_deferral: amount(row.employee_deferral),
                profit_share_contribution: amount(row.profit_share_contribution),
                defined_benefit_contribution: amount(row.defined_benefit_contribution),
                charitable_amount: amount(row.charitable_amount),
                energy_investment: amount(row.energy_investment),
                production_investment: amount(row.production_investment),
            },
        },
        name: row.name,
        strategies,
    })
}

/// Parse CSV text and return one scenario per row, in file order.
pub fn load_scenarios_from_csv(input: &str) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let scenarios = reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect::<Result<Vec<_>, _>>()?;

    if scenarios.is_empty() {
        return Err(ScenarioLoadError::Empty);
    }
    debug!(count = scenarios.len(), "parsed CSV scenarios");
    Ok(scenarios)
}

/// Reads a scenario file, choosing the format from the extension
/// (`.csv` is CSV, anything else TOML).
pub fn load_scenarios_from_file(path: &Path) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_scenarios_from_csv(&contents)
    } else {
        load_scenarios_from_toml(&contents)
    }
}
