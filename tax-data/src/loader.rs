//! CSV loader for rate schedules.
//!
//! One file may carry any subset of the four schedules the engine uses.
//! Rows for a schedule must appear in ascending order; each schedule is
//! validated as a [`BracketTable`] before it replaces the built-in one.
//!
//! ```csv
//! schedule,min_income,max_income,rate
//! federal,0,11925,0.10
//! federal,11925,,0.12
//! PA,0,,0.0307
//! ```
//!
//! Recognised schedule names are `federal`, `amt`, `NY` and `PA`. An empty
//! `max_income` marks the open-ended top bracket.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{BracketTable, BracketTableError, Jurisdiction, TaxBracket, TaxTables};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading bracket schedules.
#[derive(Debug, Error)]
pub enum BracketScheduleLoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("unknown schedule '{name}' on row {row}")]
    UnknownSchedule { name: String, row: usize },

    #[error("invalid {schedule} schedule: {source}")]
    InvalidTable {
        schedule: Schedule,
        #[source]
        source: BracketTableError,
    },
}

/// Which table a CSV row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Schedule {
    Federal,
    Amt,
    State(Jurisdiction),
}

impl Schedule {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "federal" => Some(Self::Federal),
            "amt" => Some(Self::Amt),
            other => Jurisdiction::parse(other).map(Self::State),
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Federal => f.write_str("federal"),
            Self::Amt => f.write_str("amt"),
            Self::State(jurisdiction) => f.write_str(jurisdiction.as_str()),
        }
    }
}

/// A single record from the schedule CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub struct BracketScheduleLoader;

impl BracketScheduleLoader {
    /// Parse schedule records from a CSV reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketScheduleLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = csv_reader
            .deserialize()
            .collect::<Result<Vec<BracketRecord>, _>>()?;
        Ok(records)
    }

    /// Groups records by schedule and validates each group.
    pub fn build(
        records: &[BracketRecord]
    ) -> Result<BTreeMap<Schedule, BracketTable>, BracketScheduleLoadError> {
        let mut groups: BTreeMap<Schedule, Vec<TaxBracket>> = BTreeMap::new();

        for (idx, record) in records.iter().enumerate() {
            let schedule = Schedule::parse(&record.schedule).ok_or_else(|| {
                BracketScheduleLoadError::UnknownSchedule {
                    name: record.schedule.clone(),
                    row: idx + 1,
                }
            })?;
            groups.entry(schedule).or_default().push(TaxBracket::new(
                record.min_income,
                record.max_income,
                record.rate,
            ));
        }

        groups
            .into_iter()
            .map(|(schedule, brackets)| {
                debug!(%schedule, brackets = brackets.len(), "validating schedule");
                BracketTable::new(brackets)
                    .map(|table| (schedule, table))
                    .map_err(|source| BracketScheduleLoadError::InvalidTable { schedule, source })
            })
            .collect()
    }

    /// Replaces the matching schedules in `tables`; others are left alone.
    pub fn apply(
        tables: &mut TaxTables,
        schedules: BTreeMap<Schedule, BracketTable>,
    ) {
        for (schedule, table) in schedules {
            info!(%schedule, "overriding bracket schedule");
            match schedule {
                Schedule::Federal => tables.federal_brackets = table,
                Schedule::Amt => tables.amt_brackets = table,
                Schedule::State(Jurisdiction::NewYork) => tables.new_york.brackets = table,
                Schedule::State(Jurisdiction::Pennsylvania) => tables.pennsylvania.brackets = table,
            }
        }
    }

    /// Reads a schedule file and applies it to `tables`.
    pub fn load_into(
        tables: &mut TaxTables,
        path: &Path,
    ) -> Result<usize, BracketScheduleLoadError> {
        let file = std::fs::File::open(path).map_err(|source| BracketScheduleLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records = Self::parse(file)?;
        let schedules = Self::build(&records)?;
        let count = schedules.len();
        Self::apply(tables, schedules);
        Ok(count)
    }
}
