//! Plain-text and JSON rendering of projection results.

use std::fmt::{self, Write};

use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::insights::format_currency;
use tax_core::{InsightKind, ProjectionResult, StrategyBenefit};

/// Everything printed for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub projection: ProjectionResult,
    pub benefits: Vec<StrategyBenefit>,
}

/// A scenario that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedScenario {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub scenarios: Vec<ScenarioReport>,
    pub failures: Vec<FailedScenario>,
}

fn percent(rate: Decimal) -> String {
    format!("{:.2}%", rate * Decimal::ONE_HUNDRED)
}

pub fn render_text(report: &ScenarioReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_scenario(&mut out, report)?;
    Ok(out)
}

pub fn render_batch_text(report: &BatchReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for scenario in &report.scenarios {
        write_scenario(&mut out, scenario)?;
        writeln!(out)?;
    }
    for failure in &report.failures {
        writeln!(out, "== {} ==\nFAILED: {}\n", failure.name, failure.error)?;
    }
    Ok(out)
}

fn write_scenario(
    out: &mut impl Write,
    report: &ScenarioReport,
) -> fmt::Result {
    let projection = &report.projection;

    writeln!(out, "== {} ==", report.name)?;
    writeln!(
        out,
        "{:<6} {:>16} {:>16} {:>14} {:>16} {:>8} {:>8}",
        "Year", "Baseline", "Optimized", "Savings", "Cumulative", "Eff.", "Marg."
    )?;
    for year in &projection.years {
        let label = year
            .tax_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| year.year_index.to_string());
        writeln!(
            out,
            "{:<6} {:>16} {:>16} {:>14} {:>16} {:>8} {:>8}",
            label,
            format_currency(year.baseline.total_tax),
            format_currency(year.with_strategies.total_tax),
            format_currency(year.annual_savings()),
            format_currency(year.cumulative_savings),
            percent(year.with_strategies.effective_rate()),
            percent(year.with_strategies.marginal_rate),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Capital allocated: {}", format_currency(projection.capital_allocated))?;
    writeln!(out, "Total savings:     {}", format_currency(projection.cumulative_savings))?;

    if !report.benefits.is_empty() {
        writeln!(out)?;
        writeln!(out, "Strategy benefits (first year, each on its own):")?;
        for benefit in &report.benefits {
            writeln!(
                out,
                "  {:<28} {:>14} federal {:>14} state {:>14}",
                benefit.strategy.definition().name,
                format_currency(benefit.tax_savings),
                format_currency(benefit.fed_savings),
                format_currency(benefit.state_savings),
            )?;
        }
    }

    let insights = projection
        .years
        .first()
        .map(|first| first.with_strategies.insights.as_slice())
        .unwrap_or_default();
    if !insights.is_empty() {
        writeln!(out)?;
        writeln!(out, "Insights:")?;
        for insight in insights {
            let marker = match insight.kind {
                InsightKind::Success => "+",
                InsightKind::Warning => "!",
            };
            writeln!(out, "  {marker} {}", insight.text)?;
        }
    }

    Ok(())
}

pub fn render_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{
        ClientFinancialProfile, EnabledStrategySet, ProjectionEngine, StrategyId, StrategyInputs,
        TaxEngine, TaxTables,
    };

    use super::*;

    fn report() -> ScenarioReport {
        let engine = TaxEngine::new(TaxTables::shared());
        let profile = ClientFinancialProfile {
            w2_income: dec!(250000),
            business_income: dec!(100000),
            projection_years: 2,
            base_tax_year: Some(2025),
            inputs: StrategyInputs {
                equipment_cost: dec!(50000),
                ..Default::default()
            },
            ..Default::default()
        };
        let enabled = EnabledStrategySet::baseline().with(StrategyId::EquipmentExpensing);

        ScenarioReport {
            name: "Sample".to_string(),
            projection: ProjectionEngine::new(engine).project(&profile, &enabled).unwrap(),
            benefits: engine.strategy_benefits(&profile, &enabled).unwrap(),
        }
    }

    #[test]
    fn text_lists_each_year_and_benefit() {
        let text = render_text(&report()).unwrap();

        assert!(text.starts_with("== Sample ==\n"));
        assert!(text.contains("\n2025 "));
        assert!(text.contains("\n2026 "));
        assert!(text.contains("Capital allocated: $50,000.00"));
        assert!(text.contains("  Equipment expensing "));
        assert!(text.contains("Insights:"));
        assert!(text.contains("Marg."));
    }

    #[test]
    fn first_year_marginal_rate_is_printed() {
        let report = report();
        let rate = report.projection.years[0].with_strategies.marginal_rate;

        let text = render_text(&report).unwrap();

        let first_row = text.lines().nth(2).unwrap();
        assert!(first_row.starts_with("2025 "));
        assert!(first_row.ends_with(&percent(rate)), "got {first_row}");
    }

    #[test]
    fn percent_formats_two_places() {
        assert_eq!(percent(dec!(0.2345)), "23.45%");
        assert_eq!(percent(dec!(0)), "0.00%");
    }

    #[test]
    fn json_carries_numbers_as_strings() {
        let json = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], "Sample");
        assert!(value["projection"]["capital_allocated"].is_string());
        assert_eq!(value["projection"]["years"][1]["tax_year"], 2026);
    }

    #[test]
    fn batch_text_lists_failures_last() {
        let batch = BatchReport {
            scenarios: vec![report()],
            failures: vec![FailedScenario {
                name: "Broken".to_string(),
                error: "unknown exposure level 'x'".to_string(),
            }],
        };

        let text = render_batch_text(&batch).unwrap();

        assert!(text.ends_with("== Broken ==\nFAILED: unknown exposure level 'x'\n\n"));
    }
}
