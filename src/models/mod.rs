//! Core domain model
//!
//! Value objects (money, periods, identifiers), the budget aggregate with its
//! category tree, and the events the aggregate raises.

pub mod budget;
pub mod category;
pub mod events;
pub mod ids;
pub mod money;
pub mod period;

pub use budget::{AuditStamps, Budget, BudgetSnapshot, BudgetStatus, CategorySnapshot};
pub use category::BudgetCategory;
pub use events::BudgetEvent;
pub use ids::{BudgetCategoryId, BudgetId, UserId};
pub use money::{Currency, Money, MoneyError, MoneyParseError};
pub use period::{BudgetPeriod, InvalidPeriodError, PeriodField, PeriodParseError};
