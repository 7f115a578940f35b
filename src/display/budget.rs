//! Budget display formatting
//!
//! Formats budgets for terminal output as listings, category trees and
//! audit history.

use crate::audit::AuditEntry;
use crate::models::{Budget, BudgetCategory, Currency, Money, MoneyError};
use crate::services::budget::BudgetSummary;

/// Format a budget listing as a table
pub fn format_budget_list(summaries: &[BudgetSummary]) -> String {
    if summaries.is_empty() {
        return "No budgets found.\n\nRun 'household budget create' to start one.".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<width$}  {:<7}  {:<6}  {:>10}  {:>16}  {}\n",
        "Name",
        "Period",
        "Status",
        "Categories",
        "Planned",
        "ID",
        width = name_width
    ));
    output.push_str(&format!(
        "{:-<width$}  {:-<7}  {:-<6}  {:->10}  {:->16}  {:-<12}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        width = name_width
    ));

    for summary in summaries {
        output.push_str(&format!(
            "{:<width$}  {:<7}  {:<6}  {:>10}  {:>16}  {}\n",
            summary.name,
            summary.period.to_string(),
            summary.status.to_string(),
            summary.category_count,
            summary.planned_total.to_string(),
            summary.id,
            width = name_width
        ));
    }

    output
}

/// Format a budget header followed by its category tree
pub fn format_budget_tree(budget: &Budget) -> Result<String, MoneyError> {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({}, {}) [{}]\n",
        budget.name(),
        budget.period(),
        budget.currency(),
        budget.status()
    ));
    output.push_str(&format!("  ID: {}\n\n", budget.id()));

    if budget.categories().is_empty() {
        output.push_str("  (no categories)\n");
        return Ok(output);
    }

    let roots = budget.categories();
    for (i, root) in roots.iter().enumerate() {
        let is_last = i == roots.len() - 1;
        let prefix = if is_last { "└── " } else { "├── " };
        let amount = root_amount(root, budget.currency())?;
        output.push_str(&format!("{}{}\n", prefix, category_line(root, amount)));

        let indent = if is_last { "    " } else { "│   " };
        let children = root.children();
        for (j, child) in children.iter().enumerate() {
            let child_prefix = if j == children.len() - 1 {
                "└── "
            } else {
                "├── "
            };
            output.push_str(&format!(
                "{}{}{}\n",
                indent,
                child_prefix,
                category_line(child, child.planned_amount())
            ));
        }
    }

    output.push_str(&format!("\nTotal planned: {}\n", budget.planned_total()?));
    Ok(output)
}

/// Format audit history, oldest first
pub fn format_history(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No history recorded.".to_string();
    }

    entries
        .iter()
        .map(AuditEntry::format_human_readable)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A root with subcategories shows the sum of its children
fn root_amount(root: &BudgetCategory, currency: Currency) -> Result<Option<Money>, MoneyError> {
    if root.is_leaf() {
        return Ok(root.planned_amount());
    }

    let mut amounts = root.children().iter().filter_map(|c| c.planned_amount()).peekable();
    if amounts.peek().is_none() {
        return Ok(None);
    }
    Money::sum_in(currency, amounts).map(Some)
}

fn category_line(category: &BudgetCategory, amount: Option<Money>) -> String {
    let mut line = category.name().to_string();
    if let Some(amount) = amount {
        line.push_str(&format!("  {}", amount));
    }
    if let Some(description) = category.description() {
        line.push_str(&format!("  ({})", description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use rust_decimal::Decimal;

    fn zar(amount: i64) -> Money {
        Money::of(Decimal::new(amount, 0), "ZAR").unwrap()
    }

    #[test]
    fn test_tree_shows_subtotals() {
        let mut budget = Budget::create(UserId::new(), "Household", 2024, 6, "ZAR").unwrap();
        let food = budget.add_category("Food", None, None).unwrap();
        let groceries = budget.add_category("Groceries", Some("weekly"), Some(food)).unwrap();
        let takeaways = budget.add_category("Takeaways", None, Some(food)).unwrap();
        budget.add_category("Rent", None, None).unwrap();
        budget.set_planned_amount(groceries, zar(450)).unwrap();
        budget.set_planned_amount(takeaways, zar(50)).unwrap();

        let output = format_budget_tree(&budget).unwrap();

        assert!(output.starts_with("Household (2024-06, ZAR) [Draft]"));
        assert!(output.contains("├── Food  ZAR 500.00"));
        assert!(output.contains("│   ├── Groceries  ZAR 450.00  (weekly)"));
        assert!(output.contains("└── Rent\n"));
        assert!(output.contains("Total planned: ZAR 500.00"));
    }

    #[test]
    fn test_empty_tree() {
        let budget = Budget::create(UserId::new(), "Empty", 2024, 6, "USD").unwrap();
        assert!(format_budget_tree(&budget).unwrap().contains("(no categories)"));
    }

    #[test]
    fn test_empty_list() {
        assert!(format_budget_list(&[]).starts_with("No budgets found."));
        assert_eq!(format_history(&[]), "No history recorded.");
    }
}
