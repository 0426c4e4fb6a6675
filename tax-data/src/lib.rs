mod loader;
mod scenario;
mod tables;

pub use loader::{BracketRecord, BracketScheduleLoadError, BracketScheduleLoader, Schedule};
pub use scenario::{
    ScenarioLoadError, load_scenarios_from_csv, load_scenarios_from_file,
    load_scenarios_from_toml, parse_strategies,
};
pub use tables::{TablesLoadError, load_tables_from_file, load_tables_from_str, tables_to_toml};
