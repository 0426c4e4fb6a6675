//! TOML loader for a complete set of tax tables.
//!
//! The file mirrors [`TaxTables`] field for field. Bracket schedules are
//! arrays of `{ min_income, max_income, tax_rate }` tables and are checked
//! for contiguity while parsing; rates and limits are checked afterwards.

use std::path::Path;

use tax_core::{TaxTables, TaxTablesError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TablesLoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tax tables: {0}")]
    Invalid(#[from] TaxTablesError),
}

/// Parses and validates tables from TOML text.
pub fn load_tables_from_str(input: &str) -> Result<TaxTables, TablesLoadError> {
    let tables: TaxTables = toml::from_str(input)?;
    tables.validate()?;
    info!(tax_year = tables.tax_year, "loaded tax tables");
    Ok(tables)
}

pub fn load_tables_from_file(path: &Path) -> Result<TaxTables, TablesLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TablesLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_tables_from_str(&contents)
}

/// Serialises tables back to TOML, e.g. to give users an editable template.
pub fn tables_to_toml(tables: &TaxTables) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(tables)
}
