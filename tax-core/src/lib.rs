pub mod calculations;
pub mod config;
pub mod models;

pub use calculations::{ProjectionEngine, TaxEngine, TaxEngineError};
pub use config::{TaxTables, TaxTablesError};
pub use models::*;
