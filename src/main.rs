use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use household_budget::audit::SystemAuditor;
use household_budget::cli::{
    handle_budget_command, handle_config_command, BudgetCommands, ConfigCommands,
};
use household_budget::config::paths::DATA_DIR_ENV;
use household_budget::config::{HouseholdPaths, Settings};
use household_budget::storage::Storage;

#[derive(Parser, Debug)]
#[command(
    name = "household",
    version,
    about = "Plan monthly household budgets from the command line",
    long_about = "Plan a monthly household budget: a two-level tree of categories, \
                  a planned amount per category in a single currency, and a \
                  Draft/Active lifecycle. Every change is recorded in an audit log."
)]
struct Cli {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// Defaults to the configured level. RUST_LOG overrides both.
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    /// Directory holding settings, budgets and the audit log
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.data_dir {
        Some(dir) => HouseholdPaths::with_base_dir(dir.clone()),
        None => HouseholdPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    let log_level = cli
        .log_level
        .or_else(|| settings.log_level.parse().ok())
        .unwrap_or(LevelFilter::WARN);
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());
    trace!("{cli:?}");

    match cli.command {
        Some(Commands::Budget(cmd)) => {
            let owner = settings.owner_or_init(&paths)?;
            let auditor = SystemAuditor::new(owner);
            let storage = Storage::open(paths)?;
            handle_budget_command(&storage, &settings, &auditor, cmd)?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(&paths, &mut settings, action.unwrap_or(ConfigCommands::Show))?;
        }
        None => {
            println!("household - monthly household budgets");
            println!();
            println!("Run 'household --help' for usage information.");
            println!("Run 'household budget create <NAME>' to start a budget.");
        }
    }

    Ok(())
}

/// Log to stderr for this crate only, unless RUST_LOG says otherwise
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "household_budget={},{}={}",
            level,
            env!("CARGO_CRATE_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
