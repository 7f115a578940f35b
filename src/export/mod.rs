//! Budget export
//!
//! - CSV: one row per category (spreadsheet-compatible)
//! - JSON: machine-readable, schema-versioned
//! - YAML: the JSON content, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_budget_csv;
pub use self::json::{export_budget_json, BudgetExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::export_budget_yaml;
