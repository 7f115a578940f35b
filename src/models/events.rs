//! Domain events raised by the budget aggregate
//!
//! Every successful mutation appends exactly one event to the budget's
//! pending list. The list is never persisted with the budget; whoever saves
//! the budget drains it and hands the events on (the audit log, for now).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetCategoryId, BudgetId, UserId};
use super::money::{Currency, Money};
use super::period::BudgetPeriod;

/// Something that happened to a budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BudgetEvent {
    BudgetCreated {
        budget_id: BudgetId,
        owner: UserId,
        name: String,
        period: BudgetPeriod,
        currency: Currency,
    },
    CategoryAdded {
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        parent_id: Option<BudgetCategoryId>,
        name: String,
    },
    CategoryRenamed {
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        old_name: String,
        new_name: String,
    },
    CategoryDescriptionChanged {
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        description: Option<String>,
    },
    CategoryRemoved {
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        parent_id: Option<BudgetCategoryId>,
        name: String,
    },
    CategoriesReordered {
        budget_id: BudgetId,
        parent_id: Option<BudgetCategoryId>,
        order: Vec<BudgetCategoryId>,
    },
    PlannedAmountSet {
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        previous: Option<Money>,
        amount: Money,
    },
    PlannedAmountCleared {
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        previous: Option<Money>,
    },
    BudgetActivated {
        budget_id: BudgetId,
    },
}

impl BudgetEvent {
    /// Short event name, e.g. "category_added"
    pub fn name(&self) -> &'static str {
        match self {
            Self::BudgetCreated { .. } => "budget_created",
            Self::CategoryAdded { .. } => "category_added",
            Self::CategoryRenamed { .. } => "category_renamed",
            Self::CategoryDescriptionChanged { .. } => "category_description_changed",
            Self::CategoryRemoved { .. } => "category_removed",
            Self::CategoriesReordered { .. } => "categories_reordered",
            Self::PlannedAmountSet { .. } => "planned_amount_set",
            Self::PlannedAmountCleared { .. } => "planned_amount_cleared",
            Self::BudgetActivated { .. } => "budget_activated",
        }
    }

    pub fn budget_id(&self) -> BudgetId {
        match self {
            Self::BudgetCreated { budget_id, .. }
            | Self::CategoryAdded { budget_id, .. }
            | Self::CategoryRenamed { budget_id, .. }
            | Self::CategoryDescriptionChanged { budget_id, .. }
            | Self::CategoryRemoved { budget_id, .. }
            | Self::CategoriesReordered { budget_id, .. }
            | Self::PlannedAmountSet { budget_id, .. }
            | Self::PlannedAmountCleared { budget_id, .. }
            | Self::BudgetActivated { budget_id } => *budget_id,
        }
    }

    /// The category the event is about, if any
    pub fn category_id(&self) -> Option<BudgetCategoryId> {
        match self {
            Self::CategoryAdded { category_id, .. }
            | Self::CategoryRenamed { category_id, .. }
            | Self::CategoryDescriptionChanged { category_id, .. }
            | Self::CategoryRemoved { category_id, .. }
            | Self::PlannedAmountSet { category_id, .. }
            | Self::PlannedAmountCleared { category_id, .. } => Some(*category_id),
            Self::BudgetCreated { .. }
            | Self::CategoriesReordered { .. }
            | Self::BudgetActivated { .. } => None,
        }
    }
}

impl fmt::Display for BudgetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetCreated {
                name,
                period,
                currency,
                ..
            } => write!(f, "created budget '{}' for {} in {}", name, period, currency),
            Self::CategoryAdded { name, .. } => write!(f, "added category '{}'", name),
            Self::CategoryRenamed {
                old_name, new_name, ..
            } => write!(f, "renamed category '{}' to '{}'", old_name, new_name),
            Self::CategoryDescriptionChanged { category_id, .. } => {
                write!(f, "changed description of {}", category_id)
            }
            Self::CategoryRemoved { name, .. } => write!(f, "removed category '{}'", name),
            Self::CategoriesReordered { order, .. } => {
                write!(f, "reordered {} categories", order.len())
            }
            Self::PlannedAmountSet {
                category_id,
                amount,
                ..
            } => write!(f, "planned {} for {}", amount, category_id),
            Self::PlannedAmountCleared { category_id, .. } => {
                write!(f, "cleared planned amount for {}", category_id)
            }
            Self::BudgetActivated { .. } => write!(f, "activated budget"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let budget_id = BudgetId::new();
        let category_id = BudgetCategoryId::new();
        let event = BudgetEvent::CategoryAdded {
            budget_id,
            category_id,
            parent_id: None,
            name: "Food".into(),
        };

        assert_eq!(event.name(), "category_added");
        assert_eq!(event.budget_id(), budget_id);
        assert_eq!(event.category_id(), Some(category_id));
        assert_eq!(event.to_string(), "added category 'Food'");
    }

    #[test]
    fn test_serialization_is_tagged() {
        let event = BudgetEvent::BudgetActivated {
            budget_id: BudgetId::new(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "budget_activated");

        let back: BudgetEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }
}
