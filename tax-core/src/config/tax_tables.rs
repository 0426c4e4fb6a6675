//! Statutory tables and constants the engine reads.
//!
//! Everything here is immutable once built. The built-in 2025 tables are
//! constructed on first use and shared by every calculation in the process;
//! alternative tables (for what-if runs or a different year) can be loaded
//! from TOML by `tax-data` and must pass [`TaxTables::validate`] first.

use std::sync::OnceLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ExposureTable;
use crate::models::{BracketTable, BracketTableError, Jurisdiction};

/// Errors raised when a set of tables fails load-time validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTablesError {
    #[error("{name} must be between 0 and 1, got {value}")]
    RateOutOfRange { name: &'static str, value: Decimal },

    #[error("{name} must be non-negative, got {value}")]
    NegativeLimit { name: &'static str, value: Decimal },

    #[error("invalid {schedule} bracket table: {source}")]
    Brackets {
        schedule: String,
        #[source]
        source: BracketTableError,
    },
}

/// Federal constants for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalParameters {
    pub standard_deduction: Decimal,

    /// Flat rate applied to long-term gains.
    pub long_term_capital_gains_rate: Decimal,

    /// Net capital loss that may offset ordinary income in one year.
    pub capital_loss_ordinary_offset_limit: Decimal,

    pub amt_exemption: Decimal,
    pub amt_phaseout_start: Decimal,

    /// Exemption lost per dollar of AMTI above the phase-out start.
    pub amt_phaseout_rate: Decimal,

    /// Section 179 expensing limit.
    pub equipment_expensing_cap: Decimal,

    /// Share of (wages + business income − above-AGI deductions) that
    /// charitable gifts may offset.
    pub charitable_agi_limit_rate: Decimal,

    pub qbi_deduction_rate: Decimal,

    /// The QBI deduction is only available below this taxable income.
    pub qbi_taxable_income_ceiling: Decimal,

    pub employee_deferral_limit: Decimal,
    pub profit_share_limit: Decimal,
    #[serde(default)]
    pub defined_benefit_limit: Option<Decimal>,

    /// Fraction of an energy investment deductible in the first year.
    pub energy_deduction_rate: Decimal,

    /// Fraction of a production investment deductible in the first year.
    pub production_deduction_rate: Decimal,
}

/// How one state treats each federal deduction, plus its rate schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRules {
    pub brackets: BracketTable,

    /// State limit on equipment expensing; `None` follows the federal amount.
    #[serde(default)]
    pub equipment_deduction_cap: Option<Decimal>,

    /// Share of the federal charitable deduction the state allows; `None`
    /// means no state charitable deduction at all.
    #[serde(default)]
    pub charitable_pass_through_rate: Option<Decimal>,

    /// Whether the state mirrors energy and production deductions.
    pub conforms_to_alternative_investments: bool,

    /// Whether employee deferrals must be added back to state income.
    pub employee_deferral_add_back: bool,
}

/// The complete, validated set of tables a [`TaxEngine`] runs against.
///
/// [`TaxEngine`]: crate::calculations::TaxEngine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTables {
    pub tax_year: i32,
    pub federal: FederalParameters,
    pub federal_brackets: BracketTable,
    pub amt_brackets: BracketTable,
    pub new_york: JurisdictionRules,
    pub pennsylvania: JurisdictionRules,
    #[serde(default)]
    pub exposure_levels: ExposureTable,
}

impl TaxTables {
    /// Returns the process-wide built-in tables.
    pub fn shared() -> &'static TaxTables {
        static TABLES: OnceLock<TaxTables> = OnceLock::new();
        TABLES.get_or_init(TaxTables::default_2025)
    }

    /// 2025 single-filer schedules.
    pub fn default_2025() -> Self {
        Self {
            tax_year: 2025,
            federal: FederalParameters {
                standard_deduction: dec!(15000),
                long_term_capital_gains_rate: dec!(0.20),
                capital_loss_ordinary_offset_limit: dec!(3000),
                amt_exemption: dec!(88100),
                amt_phaseout_start: dec!(626350),
                amt_phaseout_rate: dec!(0.25),
                equipment_expensing_cap: dec!(1250000),
                charitable_agi_limit_rate: dec!(0.30),
                qbi_deduction_rate: dec!(0.20),
                qbi_taxable_income_ceiling: dec!(197300),
                employee_deferral_limit: dec!(23500),
                profit_share_limit: dec!(70000),
                defined_benefit_limit: None,
                energy_deduction_rate: dec!(0.80),
                production_deduction_rate: dec!(1.00),
            },
            federal_brackets: builtin_schedule(&[
                (dec!(0.10), Some(dec!(11925))),
                (dec!(0.12), Some(dec!(48475))),
                (dec!(0.22), Some(dec!(103350))),
                (dec!(0.24), Some(dec!(197300))),
                (dec!(0.32), Some(dec!(250525))),
                (dec!(0.35), Some(dec!(626350))),
                (dec!(0.37), None),
            ]),
            amt_brackets: builtin_schedule(&[
                (dec!(0.26), Some(dec!(239100))),
                (dec!(0.28), None),
            ]),
            new_york: JurisdictionRules {
                brackets: builtin_schedule(&[
                    (dec!(0.04), Some(dec!(8500))),
                    (dec!(0.045), Some(dec!(11700))),
                    (dec!(0.0525), Some(dec!(13900))),
                    (dec!(0.055), Some(dec!(80650))),
                    (dec!(0.06), Some(dec!(215400))),
                    (dec!(0.0685), Some(dec!(1077550))),
                    (dec!(0.0965), Some(dec!(5000000))),
                    (dec!(0.103), Some(dec!(25000000))),
                    (dec!(0.109), None),
                ]),
                equipment_deduction_cap: None,
                charitable_pass_through_rate: Some(dec!(0.50)),
                conforms_to_alternative_investments: true,
                employee_deferral_add_back: false,
            },
            pennsylvania: JurisdictionRules {
                brackets: builtin_schedule(&[(dec!(0.0307), None)]),
                equipment_deduction_cap: Some(dec!(25000)),
                charitable_pass_through_rate: None,
                conforms_to_alternative_investments: false,
                employee_deferral_add_back: true,
            },
            exposure_levels: ExposureTable::default_levels(),
        }
    }

    pub fn jurisdiction(
        &self,
        jurisdiction: Jurisdiction,
    ) -> &JurisdictionRules {
        match jurisdiction {
            Jurisdiction::NewYork => &self.new_york,
            Jurisdiction::Pennsylvania => &self.pennsylvania,
        }
    }

    /// Checks every rate and limit. Bracket tables are already validated on
    /// construction and deserialization.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxTablesError`] found.
    pub fn validate(&self) -> Result<(), TaxTablesError> {
        let f = &self.federal;

        for (name, value) in [
            ("long_term_capital_gains_rate", f.long_term_capital_gains_rate),
            ("amt_phaseout_rate", f.amt_phaseout_rate),
            ("charitable_agi_limit_rate", f.charitable_agi_limit_rate),
            ("qbi_deduction_rate", f.qbi_deduction_rate),
            ("energy_deduction_rate", f.energy_deduction_rate),
            ("production_deduction_rate", f.production_deduction_rate),
        ] {
            check_rate(name, value)?;
        }

        for (name, value) in [
            ("standard_deduction", f.standard_deduction),
            (
                "capital_loss_ordinary_offset_limit",
                f.capital_loss_ordinary_offset_limit,
            ),
            ("amt_exemption", f.amt_exemption),
            ("amt_phaseout_start", f.amt_phaseout_start),
            ("equipment_expensing_cap", f.equipment_expensing_cap),
            ("qbi_taxable_income_ceiling", f.qbi_taxable_income_ceiling),
            ("employee_deferral_limit", f.employee_deferral_limit),
            ("profit_share_limit", f.profit_share_limit),
        ] {
            check_limit(name, value)?;
        }
        if let Some(limit) = f.defined_benefit_limit {
            check_limit("defined_benefit_limit", limit)?;
        }

        for jurisdiction in Jurisdiction::ALL {
            let rules = self.jurisdiction(jurisdiction);
            if let Some(cap) = rules.equipment_deduction_cap {
                check_limit("equipment_deduction_cap", cap)?;
            }
            if let Some(rate) = rules.charitable_pass_through_rate {
                check_rate("charitable_pass_through_rate", rate)?;
            }
        }

        for (_, rates) in self.exposure_levels.iter() {
            check_limit("short_term_loss_rate", rates.short_term_loss_rate)?;
            check_limit("long_term_gain_rate", rates.long_term_gain_rate)?;
        }

        Ok(())
    }
}

impl Default for TaxTables {
    fn default() -> Self {
        Self::default_2025()
    }
}

/// Built-in rows are contiguous by construction; the tests re-validate them.
fn builtin_schedule(rows: &[(Decimal, Option<Decimal>)]) -> BracketTable {
    BracketTable::chained(rows)
}

fn check_rate(
    name: &'static str,
    value: Decimal,
) -> Result<(), TaxTablesError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(TaxTablesError::RateOutOfRange { name, value });
    }
    Ok(())
}

fn check_limit(
    name: &'static str,
    value: Decimal,
) -> Result<(), TaxTablesError> {
    if value < Decimal::ZERO {
        return Err(TaxTablesError::NegativeLimit { name, value });
    }
    Ok(())
}
