//! CSV Export functionality
//!
//! One row per category, roots before their subcategories, in display order.

use std::io::Write;

use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Budget, BudgetCategory};

const HEADER: [&str; 8] = [
    "Budget",
    "Period",
    "Category",
    "Parent",
    "Planned",
    "Currency",
    "Description",
    "ID",
];

/// Export a budget's categories to CSV
pub fn export_budget_csv<W: Write>(budget: &Budget, writer: W) -> HouseholdResult<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    let map_err = |e: ::csv::Error| HouseholdError::Export(e.to_string());

    csv_writer.write_record(HEADER).map_err(map_err)?;

    for root in budget.categories() {
        write_row(&mut csv_writer, budget, root, None).map_err(map_err)?;
        for child in root.children() {
            write_row(&mut csv_writer, budget, child, Some(root)).map_err(map_err)?;
        }
    }

    csv_writer
        .flush()
        .map_err(|e| HouseholdError::Export(e.to_string()))?;
    Ok(())
}

fn write_row<W: Write>(
    csv_writer: &mut ::csv::Writer<W>,
    budget: &Budget,
    category: &BudgetCategory,
    parent: Option<&BudgetCategory>,
) -> Result<(), ::csv::Error> {
    let period = budget.period().to_string();
    let planned = category
        .planned_amount()
        .map(|m| format!("{:.2}", m.amount()))
        .unwrap_or_default();
    let id = category.id().as_uuid().to_string();

    csv_writer.write_record([
        budget.name(),
        period.as_str(),
        category.name(),
        parent.map(|p| p.name()).unwrap_or(""),
        planned.as_str(),
        budget.currency().code(),
        category.description().unwrap_or(""),
        id.as_str(),
    ])
}
