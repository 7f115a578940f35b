//! Audit entry data structures
//!
//! One [`AuditEntry`] is written per domain event the budget aggregate raises,
//! plus one for a budget deletion (which happens outside the aggregate).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Budget, BudgetEvent, BudgetId, UserId};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Budget,
    Category,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Budget => write!(f, "Budget"),
            EntityType::Category => write!(f, "Category"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Who performed it
    pub actor: UserId,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// The budget the entity belongs to
    pub budget_id: BudgetId,

    /// ID of the affected entity (budget or category)
    pub entity_id: String,

    /// Human-readable name of the entity, when the event carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Event name, e.g. "planned_amount_set"
    pub event: String,

    /// The full event, or the deleted budget for deletions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// One-line description of the change
    pub summary: String,
}

impl AuditEntry {
    /// Build the entry for a drained domain event
    pub fn from_event(event: &BudgetEvent, actor: UserId, timestamp: DateTime<Utc>) -> Self {
        let budget_id = event.budget_id();

        let (operation, entity_type) = match event {
            BudgetEvent::BudgetCreated { .. } => (Operation::Create, EntityType::Budget),
            BudgetEvent::CategoryAdded { .. } => (Operation::Create, EntityType::Category),
            BudgetEvent::CategoryRemoved { .. } => (Operation::Delete, EntityType::Category),
            BudgetEvent::CategoriesReordered { .. } | BudgetEvent::BudgetActivated { .. } => {
                (Operation::Update, EntityType::Budget)
            }
            BudgetEvent::CategoryRenamed { .. }
            | BudgetEvent::CategoryDescriptionChanged { .. }
            | BudgetEvent::PlannedAmountSet { .. }
            | BudgetEvent::PlannedAmountCleared { .. } => {
                (Operation::Update, EntityType::Category)
            }
        };

        let entity_name = match event {
            BudgetEvent::BudgetCreated { name, .. }
            | BudgetEvent::CategoryAdded { name, .. }
            | BudgetEvent::CategoryRemoved { name, .. } => Some(name.clone()),
            BudgetEvent::CategoryRenamed { new_name, .. } => Some(new_name.clone()),
            _ => None,
        };

        let entity_id = event
            .category_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| budget_id.to_string());

        Self {
            timestamp,
            actor,
            operation,
            entity_type,
            budget_id,
            entity_id,
            entity_name,
            event: event.name().to_string(),
            details: serde_json::to_value(event).ok(),
            summary: event.to_string(),
        }
    }

    /// Build the entry for a deleted budget, keeping its last state
    pub fn budget_deleted(budget: &Budget, actor: UserId, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            actor,
            operation: Operation::Delete,
            entity_type: EntityType::Budget,
            budget_id: budget.id(),
            entity_id: budget.id().to_string(),
            entity_name: Some(budget.name().to_string()),
            event: "budget_deleted".to_string(),
            details: serde_json::to_value(budget).ok(),
            summary: format!("deleted budget '{}' for {}", budget.name(), budget.period()),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        output.push_str(&format!(" by {}\n  {}", self.actor, self.summary));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetCategoryId, Money};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Update.to_string(), "UPDATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_created_event_entry() {
        let actor = UserId::new();
        let budget = Budget::create(actor, "June", 2024, 6, "ZAR").unwrap();
        let event = &budget.pending_events()[0];

        let entry = AuditEntry::from_event(event, actor, at());
        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Budget);
        assert_eq!(entry.entity_id, budget.id().to_string());
        assert_eq!(entry.entity_name.as_deref(), Some("June"));
        assert_eq!(entry.event, "budget_created");
        assert_eq!(entry.details.as_ref().unwrap()["type"], "budget_created");
    }

    #[test]
    fn test_planned_amount_entry_targets_category() {
        let budget_id = BudgetId::new();
        let category_id = BudgetCategoryId::new();
        let event = BudgetEvent::PlannedAmountSet {
            budget_id,
            category_id,
            previous: None,
            amount: Money::of(Decimal::new(450, 0), "ZAR").unwrap(),
        };

        let entry = AuditEntry::from_event(&event, UserId::new(), at());
        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(entry.entity_type, EntityType::Category);
        assert_eq!(entry.budget_id, budget_id);
        assert_eq!(entry.entity_id, category_id.to_string());
        assert!(entry.summary.contains("ZAR 450.00"));
    }

    #[test]
    fn test_human_readable() {
        let event = BudgetEvent::CategoryRemoved {
            budget_id: BudgetId::new(),
            category_id: BudgetCategoryId::new(),
            parent_id: None,
            name: "Rent".into(),
        };
        let entry = AuditEntry::from_event(&event, UserId::new(), at());

        let output = entry.format_human_readable();
        assert!(output.starts_with("[2024-06-01 09:30:00 UTC] DELETE Category cat-"));
        assert!(output.contains("(Rent)"));
        assert!(output.contains("removed category 'Rent'"));
    }

    #[test]
    fn test_budget_deleted_entry() {
        let actor = UserId::new();
        let budget = Budget::create(actor, "June", 2024, 6, "ZAR").unwrap();

        let entry = AuditEntry::budget_deleted(&budget, actor, at());
        assert_eq!(entry.operation, Operation::Delete);
        assert_eq!(entry.event, "budget_deleted");
        assert_eq!(entry.details.as_ref().unwrap()["name"], "June");
    }
}
