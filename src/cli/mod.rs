//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer.

pub mod budget;
pub mod config;

pub use budget::{handle_budget_command, BudgetCommands, ExportFormat};
pub use config::{handle_config_command, ConfigCommands};
