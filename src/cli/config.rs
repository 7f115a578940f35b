//! Configuration CLI commands

use clap::Subcommand;
use tracing_subscriber::filter::LevelFilter;

use crate::config::{HouseholdPaths, Settings};
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Currency, UserId};

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show paths and settings
    Show,

    /// Set the currency used when `budget create` gets none
    SetCurrency {
        /// ISO 4217 code, e.g. ZAR
        code: String,
    },

    /// Set the acting user
    SetOwner {
        /// User ID (usr-... or a full UUID)
        id: String,
    },

    /// Set the default log level
    SetLogLevel {
        /// One of: off, error, warn, info, debug, trace
        level: String,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &HouseholdPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> HouseholdResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("Household Budget Configuration");
            println!("==============================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Budgets file:     {}", paths.budgets_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Default currency: {}", settings.default_currency);
            match settings.default_owner {
                Some(owner) => println!("  Default owner:    {}", owner.as_uuid()),
                None => println!("  Default owner:    (not set)"),
            }
            println!("  Log level:        {}", settings.log_level);
            return Ok(());
        }

        ConfigCommands::SetCurrency { code } => {
            let currency = Currency::parse(&code)?;
            settings.default_currency = currency.to_string();
            println!("Default currency set to {}", currency);
        }

        ConfigCommands::SetOwner { id } => {
            let owner: UserId = id
                .trim()
                .parse()
                .map_err(|_| HouseholdError::Validation(format!("Invalid user ID: {}", id)))?;
            settings.default_owner = Some(owner);
            println!("Default owner set to {}", owner.as_uuid());
        }

        ConfigCommands::SetLogLevel { level } => {
            let filter: LevelFilter = level
                .parse()
                .map_err(|_| HouseholdError::Validation(format!("Invalid log level: {}", level)))?;
            settings.log_level = filter.to_string().to_lowercase();
            println!("Log level set to {}", settings.log_level);
        }
    }

    settings.save(paths)
}
