//! Immutable configuration: rate schedules, statutory limits, jurisdiction
//! rules and the exposure-level table.

mod exposure;
mod tax_tables;

pub use exposure::{ExposureRates, ExposureTable};
pub use tax_tables::{FederalParameters, JurisdictionRules, TaxTables, TaxTablesError};
