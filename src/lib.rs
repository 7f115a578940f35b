//! Household budget planning
//!
//! The budget-planning core of a household-management application: a monthly
//! [`Budget`](models::Budget) owning a two-level tree of categories, each with
//! an optional planned amount in the budget's single currency, and a
//! Draft/Active lifecycle.
//!
//! # Architecture
//!
//! - `models`: value objects (money, periods, IDs), the budget aggregate,
//!   its categories and domain events
//! - `error`: domain and application error types
//! - `storage`: JSON file storage with optimistic concurrency
//! - `audit`: actor/clock abstraction and the append-only audit log
//! - `services`: command/query handlers over the aggregate
//! - `config`: path resolution and user settings
//! - `display`, `export`, `cli`: the `household` command-line surface
//!
//! # Example
//!
//! ```rust,ignore
//! use household_budget::audit::SystemAuditor;
//! use household_budget::config::HouseholdPaths;
//! use household_budget::services::BudgetService;
//! use household_budget::storage::Storage;
//!
//! let storage = Storage::open(HouseholdPaths::new()?)?;
//! let auditor = SystemAuditor::new(owner);
//! let service = BudgetService::new(&storage, &auditor);
//!
//! let budget = service.create_budget("Household", 2024, 6, "ZAR")?;
//! let food = service.add_category(budget.id(), "Food", None, None)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{BudgetError, HouseholdError, HouseholdResult};
