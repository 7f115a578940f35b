//! YAML Export functionality
//!
//! Same content as the JSON export, in a human-readable form.

use std::io::Write;

use crate::error::{HouseholdError, HouseholdResult};
use crate::export::json::BudgetExport;

/// Export a budget to YAML
pub fn export_budget_yaml<W: Write>(export: &BudgetExport, writer: &mut W) -> HouseholdResult<()> {
    let map_err = |e: std::io::Error| HouseholdError::Export(e.to_string());

    writeln!(writer, "# Household budget export").map_err(map_err)?;
    writeln!(writer, "# Budget: {} ({})", export.budget.name, export.budget.period)
        .map_err(map_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(map_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(map_err)?;
    writeln!(writer).map_err(map_err)?;

    serde_yaml::to_writer(writer, export).map_err(|e| HouseholdError::Export(e.to_string()))?;

    Ok(())
}
