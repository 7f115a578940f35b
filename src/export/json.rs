//! JSON Export functionality
//!
//! Exports a single budget with schema versioning. The payload reuses the
//! storage record shape, so categories appear as a flat list with parent
//! references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Budget, Money};
use crate::storage::BudgetRecord;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Single-budget export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetExport {
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub budget: BudgetRecord,

    pub metadata: ExportMetadata,
}

/// Derived figures, for readers that don't want to walk the tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub category_count: usize,
    pub planned_total: Money,
}

impl BudgetExport {
    pub fn new(budget: &Budget, version: u64) -> HouseholdResult<Self> {
        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            budget: BudgetRecord::from_budget(budget, version),
            metadata: ExportMetadata {
                category_count: budget.category_count(),
                planned_total: budget.planned_total()?,
            },
        })
    }
}

/// Export a budget to JSON
pub fn export_budget_json<W: Write>(
    export: &BudgetExport,
    writer: &mut W,
    pretty: bool,
) -> HouseholdResult<()> {
    let result = if pretty {
        serde_json::to_writer_pretty(&mut *writer, export)
    } else {
        serde_json::to_writer(&mut *writer, export)
    };
    result.map_err(|e| HouseholdError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| HouseholdError::Export(e.to_string()))?;
    Ok(())
}
