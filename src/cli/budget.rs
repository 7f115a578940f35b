//! Budget CLI commands
//!
//! Parses arguments into domain values, calls [`BudgetService`], and prints
//! the outcome. Budgets are addressed by name, short ID or full ID; categories
//! by name, `Parent/Child` path or short ID.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::audit::Auditor;
use crate::config::settings::Settings;
use crate::display::budget::{format_budget_list, format_budget_tree, format_history};
use crate::error::{BudgetError, HouseholdError, HouseholdResult};
use crate::export::{export_budget_csv, export_budget_json, export_budget_yaml, BudgetExport};
use crate::models::{Budget, BudgetCategoryId, BudgetPeriod, Money, PeriodParseError};
use crate::services::budget::find_category;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// One row per category
    Csv,
    Json,
    Yaml,
}

/// Budget subcommands
#[derive(Subcommand, Debug)]
pub enum BudgetCommands {
    /// Create a new Draft budget
    Create {
        /// Budget name
        name: String,
        /// Budget period as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,
        /// ISO 4217 currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// List budgets
    #[command(alias = "ls")]
    List {
        /// Include budgets owned by other users
        #[arg(short, long)]
        all: bool,
    },

    /// Show a budget and its category tree
    Show {
        /// Budget name or ID
        budget: String,
    },

    /// Add a category, or a subcategory with --parent
    AddCategory {
        /// Budget name or ID
        budget: String,
        /// Category name
        name: String,
        /// Parent category
        #[arg(short, long)]
        parent: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Rename a category
    RenameCategory {
        /// Budget name or ID
        budget: String,
        /// Category name, Parent/Child path or ID
        category: String,
        /// New name
        new_name: String,
    },

    /// Remove a category (Draft budgets only)
    RemoveCategory {
        /// Budget name or ID
        budget: String,
        /// Category name, Parent/Child path or ID
        category: String,
    },

    /// Set the planned amount of a category
    SetPlanned {
        /// Budget name or ID
        budget: String,
        /// Category name, Parent/Child path or ID
        category: String,
        /// Amount, e.g. "450", "450.00" or "ZAR 450"
        amount: String,
    },

    /// Clear the planned amount of a category
    ClearPlanned {
        /// Budget name or ID
        budget: String,
        /// Category name, Parent/Child path or ID
        category: String,
    },

    /// Set or clear a category description
    Describe {
        /// Budget name or ID
        budget: String,
        /// Category name, Parent/Child path or ID
        category: String,
        /// New description; omit to clear it
        description: Option<String>,
    },

    /// Reorder sibling categories
    Reorder {
        /// Budget name or ID
        budget: String,
        /// Every sibling, in the new order
        #[arg(required = true, num_args = 1..)]
        categories: Vec<String>,
        /// Reorder the children of this category instead of the roots
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Activate a budget, freezing its category structure
    Activate {
        /// Budget name or ID
        budget: String,
    },

    /// Delete a budget
    Delete {
        /// Budget name or ID
        budget: String,
    },

    /// Export a budget
    Export {
        /// Budget name or ID
        budget: String,
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show the audit history of a budget
    History {
        /// Budget name or ID
        budget: String,
        /// Only show the most recent N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    auditor: &dyn Auditor,
    cmd: BudgetCommands,
) -> HouseholdResult<()> {
    let service = BudgetService::new(storage, auditor);

    match cmd {
        BudgetCommands::Create {
            name,
            period,
            currency,
        } => {
            let period = parse_period(period.as_deref())?;
            let currency = match currency {
                Some(code) => code,
                None => settings.currency()?.to_string(),
            };

            let budget =
                service.create_budget(&name, period.year(), period.month(), &currency)?;
            println!("Created budget: {} ({})", budget.name(), budget.id());
            println!("  Period:   {}", budget.period());
            println!("  Currency: {}", budget.currency());
        }

        BudgetCommands::List { all } => {
            let summaries = if all {
                service.list_all()?
            } else {
                service.list_for_owner(auditor.actor())?
            };
            println!("{}", format_budget_list(&summaries));
        }

        BudgetCommands::Show { budget } => {
            let budget = service.require(&budget)?;
            print!("{}", format_budget_tree(&budget)?);
        }

        BudgetCommands::AddCategory {
            budget,
            name,
            parent,
            description,
        } => {
            let budget = service.require(&budget)?;
            let parent_id = parent
                .as_deref()
                .map(|p| find_category(&budget, p))
                .transpose()?;

            let category_id =
                service.add_category(budget.id(), &name, description.as_deref(), parent_id)?;
            println!("Added category: {} ({})", name.trim(), category_id);
        }

        BudgetCommands::RenameCategory {
            budget,
            category,
            new_name,
        } => {
            let (budget, category_id) = resolve(&service, &budget, &category)?;
            let old_name = category_name(&budget, category_id);

            let updated = service.rename_category(budget.id(), category_id, &new_name)?;
            println!(
                "Renamed category: {} -> {}",
                old_name,
                category_name(&updated, category_id)
            );
        }

        BudgetCommands::RemoveCategory { budget, category } => {
            let (budget, category_id) = resolve(&service, &budget, &category)?;
            let name = category_name(&budget, category_id);

            service.remove_category(budget.id(), category_id)?;
            println!("Removed category: {}", name);
        }

        BudgetCommands::SetPlanned {
            budget,
            category,
            amount,
        } => {
            let (budget, category_id) = resolve(&service, &budget, &category)?;
            let amount = Money::parse(&amount, budget.currency())
                .map_err(|e| HouseholdError::Validation(e.to_string()))?;

            let updated = service.set_planned_amount(budget.id(), category_id, amount)?;
            println!(
                "Planned {} for {}",
                amount,
                category_name(&updated, category_id)
            );
            println!("  Total planned: {}", updated.planned_total()?);
        }

        BudgetCommands::ClearPlanned { budget, category } => {
            let (budget, category_id) = resolve(&service, &budget, &category)?;

            let updated = service.clear_planned_amount(budget.id(), category_id)?;
            println!(
                "Cleared planned amount for {}",
                category_name(&updated, category_id)
            );
        }

        BudgetCommands::Describe {
            budget,
            category,
            description,
        } => {
            let (budget, category_id) = resolve(&service, &budget, &category)?;

            let updated = service.update_category_description(
                budget.id(),
                category_id,
                description.as_deref(),
            )?;
            match updated.category(category_id).and_then(|c| c.description()) {
                Some(description) => println!(
                    "Description of {} set to: {}",
                    category_name(&updated, category_id),
                    description
                ),
                None => println!(
                    "Description of {} cleared",
                    category_name(&updated, category_id)
                ),
            }
        }

        BudgetCommands::Reorder {
            budget,
            categories,
            parent,
        } => {
            let budget = service.require(&budget)?;
            let parent_id = parent
                .as_deref()
                .map(|p| find_category(&budget, p))
                .transpose()?;
            let order = categories
                .iter()
                .map(|c| find_category(&budget, c))
                .collect::<HouseholdResult<Vec<BudgetCategoryId>>>()?;

            let updated = service.reorder_categories(budget.id(), parent_id, &order)?;
            let siblings = match parent_id {
                Some(id) => updated.category(id).map(|c| c.children()).unwrap_or(&[]),
                None => updated.categories(),
            };
            let names: Vec<_> = siblings.iter().map(|c| c.name()).collect();
            println!("New order: {}", names.join(", "));
        }

        BudgetCommands::Activate { budget } => {
            let budget = service.require(&budget)?;
            let updated = service.activate(budget.id())?;
            println!("Activated budget: {} ({})", updated.name(), updated.period());
        }

        BudgetCommands::Delete { budget } => {
            let budget = service.require(&budget)?;
            let deleted = service.delete_budget(budget.id())?;
            println!("Deleted budget: {} ({})", deleted.name(), deleted.id());
        }

        BudgetCommands::Export {
            budget,
            output,
            format,
            pretty,
        } => {
            let versioned = storage
                .budgets
                .find(&budget)?
                .ok_or_else(|| HouseholdError::budget_not_found(budget.as_str()))?;

            match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|e| {
                        HouseholdError::Export(format!(
                            "Failed to create file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let mut writer = BufWriter::new(file);
                    write_export(&versioned.budget, versioned.version, format, pretty, &mut writer)?;
                    writer
                        .flush()
                        .map_err(|e| HouseholdError::Export(e.to_string()))?;
                    eprintln!("Exported {} to: {}", versioned.budget.name(), path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    write_export(&versioned.budget, versioned.version, format, pretty, &mut writer)?;
                }
            }
        }

        BudgetCommands::History { budget, limit } => {
            let id = match service.find(&budget)? {
                Some(found) => found.id(),
                None => budget
                    .parse()
                    .map_err(|_| HouseholdError::budget_not_found(budget.as_str()))?,
            };

            let mut entries = service.history(id)?;
            if let Some(limit) = limit {
                let start = entries.len().saturating_sub(limit);
                entries.drain(..start);
            }
            println!("{}", format_history(&entries));
        }
    }

    Ok(())
}

/// Parse "YYYY-MM", defaulting to the current month
fn parse_period(period: Option<&str>) -> HouseholdResult<BudgetPeriod> {
    let Some(period) = period else {
        return Ok(BudgetPeriod::current());
    };

    BudgetPeriod::parse(period).map_err(|e| match e {
        PeriodParseError::OutOfRange(e) => HouseholdError::Domain(BudgetError::InvalidPeriod(e)),
        PeriodParseError::InvalidFormat(_) => HouseholdError::Validation(e.to_string()),
    })
}

fn resolve(
    service: &BudgetService<'_>,
    budget: &str,
    category: &str,
) -> HouseholdResult<(Budget, BudgetCategoryId)> {
    let budget = service.require(budget)?;
    let category_id = find_category(&budget, category)?;
    Ok((budget, category_id))
}

fn category_name(budget: &Budget, category_id: BudgetCategoryId) -> String {
    budget
        .category(category_id)
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| category_id.to_string())
}

fn write_export<W: Write>(
    budget: &Budget,
    version: u64,
    format: ExportFormat,
    pretty: bool,
    writer: &mut W,
) -> HouseholdResult<()> {
    match format {
        ExportFormat::Csv => export_budget_csv(budget, writer),
        ExportFormat::Json => export_budget_json(&BudgetExport::new(budget, version)?, writer, pretty),
        ExportFormat::Yaml => export_budget_yaml(&BudgetExport::new(budget, version)?, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodField;

    #[test]
    fn test_parse_period() {
        let period = parse_period(Some("2024-06")).unwrap();
        assert_eq!((period.year(), period.month()), (2024, 6));
        assert_eq!(parse_period(None).unwrap(), BudgetPeriod::current());
    }

    #[test]
    fn test_parse_period_errors() {
        match parse_period(Some("2024-13")).unwrap_err() {
            HouseholdError::Domain(BudgetError::InvalidPeriod(e)) => {
                assert_eq!(e.field, PeriodField::Month)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_period(Some("June")),
            Err(HouseholdError::Validation(_))
        ));
    }
}
