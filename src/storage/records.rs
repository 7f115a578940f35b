//! On-disk representation of budgets
//!
//! The stored shape is deliberately flat: categories are a single list with
//! parent references, periods and currencies are plain strings. Converting
//! back into a [`Budget`] goes through [`Budget::restore`], so a hand-edited
//! or corrupted file cannot produce a budget that breaks its invariants.

use serde::{Deserialize, Serialize};

use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{
    AuditStamps, Budget, BudgetCategoryId, BudgetId, BudgetPeriod, BudgetSnapshot, BudgetStatus,
    CategorySnapshot, Currency, Money, UserId,
};

/// Current schema version of budgets.json
pub const SCHEMA_VERSION: u32 = 1;

/// Top-level layout of budgets.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for BudgetData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            budgets: Vec::new(),
        }
    }
}

/// A stored budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub id: BudgetId,
    pub owner: UserId,
    pub name: String,
    /// "YYYY-MM"
    pub period: String,
    pub currency: String,
    pub status: BudgetStatus,
    /// Optimistic concurrency token, incremented on every save
    pub version: u64,
    #[serde(default)]
    pub stamps: AuditStamps,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

/// A stored category; subcategories reference their root via `parent_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: BudgetCategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BudgetCategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_amount: Option<Money>,
    #[serde(default)]
    pub display_order: i32,
}

impl BudgetRecord {
    /// Flatten a budget for storage
    pub fn from_budget(budget: &Budget, version: u64) -> Self {
        let snapshot = budget.snapshot();
        let mut categories = Vec::with_capacity(budget.category_count());

        for root in snapshot.categories {
            categories.push(CategoryRecord {
                id: root.id,
                name: root.name,
                description: root.description,
                parent_id: None,
                planned_amount: root.planned_amount,
                display_order: root.display_order,
            });
            for child in root.children {
                categories.push(CategoryRecord {
                    id: child.id,
                    name: child.name,
                    description: child.description,
                    parent_id: Some(root.id),
                    planned_amount: child.planned_amount,
                    display_order: child.display_order,
                });
            }
        }

        Self {
            id: snapshot.id,
            owner: snapshot.owner,
            name: snapshot.name,
            period: snapshot.period.to_string(),
            currency: snapshot.currency.to_string(),
            status: snapshot.status,
            version,
            stamps: snapshot.stamps,
            categories,
        }
    }

    /// Rebuild the aggregate, validating every stored value
    pub fn to_budget(&self) -> HouseholdResult<Budget> {
        let period = BudgetPeriod::parse(&self.period).map_err(|e| self.corrupt(e))?;
        let currency = Currency::parse(&self.currency).map_err(|e| self.corrupt(e))?;

        let mut roots: Vec<CategorySnapshot> = Vec::new();
        let mut children: Vec<&CategoryRecord> = Vec::new();

        for record in &self.categories {
            match record.parent_id {
                None => roots.push(record.to_snapshot()),
                Some(_) => children.push(record),
            }
        }

        for child in children {
            let parent_id = child.parent_id.unwrap_or(child.id);
            let parent = roots
                .iter_mut()
                .find(|root| root.id == parent_id)
                .ok_or_else(|| {
                    self.corrupt(format!(
                        "category {} references missing or nested parent {}",
                        child.id, parent_id
                    ))
                })?;
            parent.children.push(child.to_snapshot());
        }

        let snapshot = BudgetSnapshot {
            id: self.id,
            owner: self.owner,
            name: self.name.clone(),
            period,
            currency,
            status: self.status,
            stamps: self.stamps.clone(),
            categories: roots,
        };

        Budget::restore(snapshot).map_err(|e| self.corrupt(e))
    }

    fn corrupt(&self, reason: impl std::fmt::Display) -> HouseholdError {
        HouseholdError::Storage(format!("Stored budget {} is invalid: {}", self.id, reason))
    }
}

impl CategoryRecord {
    fn to_snapshot(&self) -> CategorySnapshot {
        CategorySnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            planned_amount: self.planned_amount,
            display_order: self.display_order,
            children: Vec::new(),
        }
    }
}
