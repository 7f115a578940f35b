//! Service layer
//!
//! Command and query handlers on top of the storage layer. The aggregate
//! enforces the rules; services load, persist and audit.

pub mod budget;

pub use budget::{find_category, BudgetService, BudgetSummary};
