//! The budget aggregate
//!
//! A [`Budget`] owns its category tree and is the only way to change it. All
//! invariants (tree depth, sibling-name uniqueness, single currency, the
//! Draft/Active lifecycle) are enforced here, and every operation reports
//! failure as a [`BudgetError`] value.
//!
//! Successful mutations append a [`BudgetEvent`] to a pending list that the
//! caller drains with [`Budget::take_events`] once the new state is saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::category::{
    validate_category_name, validate_description, BudgetCategory, MAX_DEPTH,
};
use super::events::BudgetEvent;
use super::ids::{BudgetCategoryId, BudgetId, UserId};
use super::money::{Currency, Money, MoneyError};
use super::period::BudgetPeriod;
use crate::error::BudgetError;

/// Maximum budget name length in characters
pub const MAX_BUDGET_NAME_LEN: usize = 100;

/// Lifecycle status of a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Categories may be added and removed
    #[default]
    Draft,
    /// The category structure is frozen; planned amounts may still change
    Active,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetStatus::Draft => write!(f, "Draft"),
            BudgetStatus::Active => write!(f, "Active"),
        }
    }
}

/// Created/modified stamps maintained by the audit collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamps {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<UserId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<UserId>,
}

/// A monthly household budget and its category tree
#[derive(Debug, Clone, Serialize)]
pub struct Budget {
    id: BudgetId,
    owner: UserId,
    name: String,
    period: BudgetPeriod,
    currency: Currency,
    status: BudgetStatus,
    categories: Vec<BudgetCategory>,
    stamps: AuditStamps,
    #[serde(skip)]
    pending_events: Vec<BudgetEvent>,
}

impl Budget {
    /// Create a new Draft budget
    ///
    /// Validates the name, the period and the currency code, in that order.
    pub fn create(
        owner: UserId,
        name: &str,
        year: i32,
        month: u32,
        currency_code: &str,
    ) -> Result<Self, BudgetError> {
        let name = validate_budget_name(name)?;
        let period = BudgetPeriod::new(year, month)?;
        let currency = Currency::parse(currency_code)?;

        let mut budget = Self {
            id: BudgetId::new(),
            owner,
            name,
            period,
            currency,
            status: BudgetStatus::Draft,
            categories: Vec::new(),
            stamps: AuditStamps::default(),
            pending_events: Vec::new(),
        };

        budget.raise(BudgetEvent::BudgetCreated {
            budget_id: budget.id,
            owner,
            name: budget.name.clone(),
            period,
            currency,
        });

        Ok(budget)
    }

    // === Accessors ===

    pub fn id(&self) -> BudgetId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> BudgetPeriod {
        self.period
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == BudgetStatus::Active
    }

    pub fn stamps(&self) -> &AuditStamps {
        &self.stamps
    }

    pub fn stamps_mut(&mut self) -> &mut AuditStamps {
        &mut self.stamps
    }

    /// Root categories in display order
    pub fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    /// Look up any category, root or subcategory
    pub fn category(&self, id: BudgetCategoryId) -> Option<&BudgetCategory> {
        self.categories.iter().find_map(|root| {
            if root.id == id {
                Some(root)
            } else {
                root.children.iter().find(|c| c.id == id)
            }
        })
    }

    /// Every category in the tree, parents before their children
    pub fn all_categories(&self) -> impl Iterator<Item = &BudgetCategory> {
        self.categories
            .iter()
            .flat_map(|root| std::iter::once(root).chain(root.children.iter()))
    }

    /// Categories without subcategories
    pub fn leaves(&self) -> impl Iterator<Item = &BudgetCategory> {
        self.all_categories().filter(|c| c.is_leaf())
    }

    pub fn category_count(&self) -> usize {
        self.all_categories().count()
    }

    /// Sum of leaf planned amounts, in the budget currency
    pub fn planned_total(&self) -> Result<Money, MoneyError> {
        Money::sum_in(self.currency, self.leaves().filter_map(|c| c.planned_amount))
    }

    // === Events ===

    /// Events raised since the last drain
    pub fn pending_events(&self) -> &[BudgetEvent] {
        &self.pending_events
    }

    /// Drain the pending events
    pub fn take_events(&mut self) -> Vec<BudgetEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn raise(&mut self, event: BudgetEvent) {
        self.pending_events.push(event);
    }

    // === Mutations ===

    /// Add a root category, or a subcategory when `parent_id` is given
    pub fn add_category(
        &mut self,
        name: &str,
        description: Option<&str>,
        parent_id: Option<BudgetCategoryId>,
    ) -> Result<BudgetCategoryId, BudgetError> {
        self.ensure_draft("add a category")?;
        let name = validate_category_name(name)?;
        let description = validate_description(description)?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .category(parent_id)
                .ok_or(BudgetError::CategoryNotFound(parent_id))?;
            if parent.depth() >= MAX_DEPTH {
                return Err(BudgetError::MaxDepthExceeded {
                    parent_id,
                    max_depth: MAX_DEPTH,
                });
            }
            // Only leaves carry planned amounts
            if let Some(amount) = parent.planned_amount {
                return Err(BudgetError::CategoryHasPlannedAmount {
                    category_id: parent_id,
                    amount,
                });
            }
        }

        let siblings = self.siblings(parent_id);
        if siblings.iter().any(|c| c.has_name(&name)) {
            return Err(BudgetError::DuplicateCategoryName { name, parent_id });
        }
        let display_order = siblings
            .iter()
            .map(|c| c.display_order)
            .max()
            .map_or(0, |max| max + 1);

        let category = BudgetCategory::new(name.clone(), description, parent_id, display_order);
        let category_id = category.id;
        self.siblings_mut(parent_id)?.push(category);

        self.raise(BudgetEvent::CategoryAdded {
            budget_id: self.id,
            category_id,
            parent_id,
            name,
        });

        Ok(category_id)
    }

    /// Rename a category; renaming to the current name is a no-op
    pub fn rename_category(
        &mut self,
        category_id: BudgetCategoryId,
        new_name: &str,
    ) -> Result<(), BudgetError> {
        let new_name = validate_category_name(new_name)?;
        let category = self
            .category(category_id)
            .ok_or(BudgetError::CategoryNotFound(category_id))?;
        let parent_id = category.parent_id;

        if category.name == new_name {
            return Ok(());
        }

        if self
            .siblings(parent_id)
            .iter()
            .any(|c| c.id != category_id && c.has_name(&new_name))
        {
            return Err(BudgetError::DuplicateCategoryName {
                name: new_name,
                parent_id,
            });
        }

        let category = self.category_mut(category_id)?;
        let old_name = std::mem::replace(&mut category.name, new_name.clone());

        self.raise(BudgetEvent::CategoryRenamed {
            budget_id: self.id,
            category_id,
            old_name,
            new_name,
        });

        Ok(())
    }

    /// Replace a category's description; `None` or blank clears it
    pub fn update_category_description(
        &mut self,
        category_id: BudgetCategoryId,
        description: Option<&str>,
    ) -> Result<(), BudgetError> {
        let description = validate_description(description)?;
        let category = self.category_mut(category_id)?;
        category.description = description.clone();

        self.raise(BudgetEvent::CategoryDescriptionChanged {
            budget_id: self.id,
            category_id,
            description,
        });

        Ok(())
    }

    /// Remove a category that has no subcategories and no planned amount
    pub fn remove_category(&mut self, category_id: BudgetCategoryId) -> Result<(), BudgetError> {
        self.ensure_draft("remove a category")?;
        let category = self
            .category(category_id)
            .ok_or(BudgetError::CategoryNotFound(category_id))?;

        if !category.children.is_empty() {
            return Err(BudgetError::CategoryHasChildren {
                category_id,
                child_count: category.children.len(),
            });
        }
        if let Some(amount) = category.planned_amount {
            return Err(BudgetError::CategoryHasPlannedAmount {
                category_id,
                amount,
            });
        }

        let parent_id = category.parent_id;
        let siblings = self.siblings_mut(parent_id)?;
        let index = siblings
            .iter()
            .position(|c| c.id == category_id)
            .ok_or(BudgetError::CategoryNotFound(category_id))?;
        let removed = siblings.remove(index);

        self.raise(BudgetEvent::CategoryRemoved {
            budget_id: self.id,
            category_id,
            parent_id,
            name: removed.name,
        });

        Ok(())
    }

    /// Assign display order among one set of siblings
    ///
    /// `order` must list every sibling under `parent_id` exactly once.
    pub fn reorder_categories(
        &mut self,
        parent_id: Option<BudgetCategoryId>,
        order: &[BudgetCategoryId],
    ) -> Result<(), BudgetError> {
        if let Some(parent_id) = parent_id {
            if self.category(parent_id).is_none() {
                return Err(BudgetError::CategoryNotFound(parent_id));
            }
        }

        let siblings = self.siblings_mut(parent_id)?;
        if order.len() != siblings.len() {
            return Err(BudgetError::InvalidOrdering {
                reason: format!("expected {} categories, got {}", siblings.len(), order.len()),
            });
        }

        for sibling in siblings.iter_mut() {
            let sibling_id = sibling.id;
            let mut positions = order.iter().enumerate().filter(|(_, id)| **id == sibling_id);
            match (positions.next(), positions.next()) {
                (Some((index, _)), None) => sibling.display_order = index as i32,
                (None, _) => {
                    return Err(BudgetError::InvalidOrdering {
                        reason: format!("{} is missing", sibling_id),
                    })
                }
                (Some(_), Some(_)) => {
                    return Err(BudgetError::InvalidOrdering {
                        reason: format!("{} is listed more than once", sibling_id),
                    })
                }
            }
        }
        siblings.sort_by_key(|c| c.display_order);

        self.raise(BudgetEvent::CategoriesReordered {
            budget_id: self.id,
            parent_id,
            order: order.to_vec(),
        });

        Ok(())
    }

    /// Set the planned amount of a category
    pub fn set_planned_amount(
        &mut self,
        category_id: BudgetCategoryId,
        amount: Money,
    ) -> Result<(), BudgetError> {
        let currency = self.currency;
        let category = self
            .category(category_id)
            .ok_or(BudgetError::CategoryNotFound(category_id))?;
        if !category.is_leaf() {
            return Err(BudgetError::CategoryHasChildren {
                category_id,
                child_count: category.children.len(),
            });
        }

        if amount.currency() != currency {
            return Err(BudgetError::InvalidAmount {
                category_id,
                reason: format!(
                    "currency {} does not match budget currency {}",
                    amount.currency(),
                    currency
                ),
            });
        }
        if amount.is_negative() {
            return Err(BudgetError::InvalidAmount {
                category_id,
                reason: format!("planned amount cannot be negative ({})", amount),
            });
        }

        let others = self
            .leaves()
            .filter(|c| c.id != category_id)
            .filter_map(|c| c.planned_amount);
        if Money::sum_in(currency, others.chain(Some(amount))).is_err() {
            return Err(BudgetError::InvalidAmount {
                category_id,
                reason: format!("planned total would overflow with {}", amount),
            });
        }

        let previous = self.category_mut(category_id)?.planned_amount.replace(amount);

        self.raise(BudgetEvent::PlannedAmountSet {
            budget_id: self.id,
            category_id,
            previous,
            amount,
        });

        Ok(())
    }

    /// Remove the planned amount of a category, if any
    pub fn clear_planned_amount(
        &mut self,
        category_id: BudgetCategoryId,
    ) -> Result<(), BudgetError> {
        let category = self.category_mut(category_id)?;
        let previous = category.planned_amount.take();

        self.raise(BudgetEvent::PlannedAmountCleared {
            budget_id: self.id,
            category_id,
            previous,
        });

        Ok(())
    }

    /// Move the budget from Draft to Active
    ///
    /// Requires at least one category and at least one leaf with a planned
    /// amount.
    pub fn activate(&mut self) -> Result<(), BudgetError> {
        if self.is_active() {
            return Err(BudgetError::ActivationValidation {
                reason: "budget is already active".into(),
            });
        }
        if self.categories.is_empty() {
            return Err(BudgetError::ActivationValidation {
                reason: "budget has no categories".into(),
            });
        }
        if !self.leaves().any(|c| c.planned_amount.is_some()) {
            return Err(BudgetError::ActivationValidation {
                reason: "no category has a planned amount".into(),
            });
        }

        self.status = BudgetStatus::Active;
        self.raise(BudgetEvent::BudgetActivated { budget_id: self.id });

        Ok(())
    }

    // === Internal helpers ===

    fn ensure_draft(&self, operation: &'static str) -> Result<(), BudgetError> {
        if self.is_active() {
            return Err(BudgetError::InvalidStatusTransition {
                status: self.status,
                operation,
            });
        }
        Ok(())
    }

    fn siblings(&self, parent_id: Option<BudgetCategoryId>) -> &[BudgetCategory] {
        match parent_id {
            None => &self.categories,
            Some(parent_id) => self
                .categories
                .iter()
                .find(|c| c.id == parent_id)
                .map(|parent| parent.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn siblings_mut(
        &mut self,
        parent_id: Option<BudgetCategoryId>,
    ) -> Result<&mut Vec<BudgetCategory>, BudgetError> {
        match parent_id {
            None => Ok(&mut self.categories),
            Some(parent_id) => self
                .categories
                .iter_mut()
                .find(|c| c.id == parent_id)
                .map(|parent| &mut parent.children)
                .ok_or(BudgetError::CategoryNotFound(parent_id)),
        }
    }

    fn category_mut(
        &mut self,
        category_id: BudgetCategoryId,
    ) -> Result<&mut BudgetCategory, BudgetError> {
        self.categories
            .iter_mut()
            .find_map(|root| {
                if root.id == category_id {
                    Some(root)
                } else {
                    root.children.iter_mut().find(|c| c.id == category_id)
                }
            })
            .ok_or(BudgetError::CategoryNotFound(category_id))
    }
}

/// Trim and validate a budget name
pub fn validate_budget_name(name: &str) -> Result<String, BudgetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BudgetError::InvalidName {
            reason: "budget name cannot be empty".into(),
        });
    }

    let len = name.chars().count();
    if len > MAX_BUDGET_NAME_LEN {
        return Err(BudgetError::InvalidName {
            reason: format!(
                "budget name too long ({} chars, max {})",
                len, MAX_BUDGET_NAME_LEN
            ),
        });
    }

    Ok(name.to_string())
}

// === Rehydration ===

/// Plain state of a budget, used to move it in and out of storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetSnapshot {
    pub id: BudgetId,
    pub owner: UserId,
    pub name: String,
    pub period: BudgetPeriod,
    pub currency: Currency,
    pub status: BudgetStatus,
    pub stamps: AuditStamps,
    pub categories: Vec<CategorySnapshot>,
}

/// Plain state of one category and its subcategories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySnapshot {
    pub id: BudgetCategoryId,
    pub name: String,
    pub description: Option<String>,
    pub planned_amount: Option<Money>,
    pub display_order: i32,
    pub children: Vec<CategorySnapshot>,
}

impl Budget {
    /// Capture the current state
    pub fn snapshot(&self) -> BudgetSnapshot {
        fn category(c: &BudgetCategory) -> CategorySnapshot {
            CategorySnapshot {
                id: c.id,
                name: c.name.clone(),
                description: c.description.clone(),
                planned_amount: c.planned_amount,
                display_order: c.display_order,
                children: c.children.iter().map(category).collect(),
            }
        }

        BudgetSnapshot {
            id: self.id,
            owner: self.owner,
            name: self.name.clone(),
            period: self.period,
            currency: self.currency,
            status: self.status,
            stamps: self.stamps.clone(),
            categories: self.categories.iter().map(category).collect(),
        }
    }

    /// Rebuild a budget from stored state, re-checking every invariant
    ///
    /// No events are raised.
    pub fn restore(snapshot: BudgetSnapshot) -> Result<Self, BudgetError> {
        let name = validate_budget_name(&snapshot.name)?;
        let currency = snapshot.currency;

        let mut seen = HashSet::new();
        let categories = restore_level(snapshot.categories, None, currency, &mut seen)?;

        let budget = Self {
            id: snapshot.id,
            owner: snapshot.owner,
            name,
            period: snapshot.period,
            currency,
            status: snapshot.status,
            categories,
            stamps: snapshot.stamps,
            pending_events: Vec::new(),
        };
        budget.planned_total()?;

        Ok(budget)
    }
}

fn restore_level(
    snapshots: Vec<CategorySnapshot>,
    parent_id: Option<BudgetCategoryId>,
    currency: Currency,
    seen: &mut HashSet<BudgetCategoryId>,
) -> Result<Vec<BudgetCategory>, BudgetError> {
    let mut level: Vec<BudgetCategory> = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        if !seen.insert(snapshot.id) {
            return Err(BudgetError::DuplicateCategoryId(snapshot.id));
        }
        let name = validate_category_name(&snapshot.name)?;
        if level.iter().any(|c| c.has_name(&name)) {
            return Err(BudgetError::DuplicateCategoryName { name, parent_id });
        }

        if let Some(amount) = snapshot.planned_amount {
            if amount.currency() != currency || amount.is_negative() {
                return Err(BudgetError::InvalidAmount {
                    category_id: snapshot.id,
                    reason: format!("stored planned amount {} is not valid", amount),
                });
            }
        }

        if let (Some(amount), false) = (snapshot.planned_amount, snapshot.children.is_empty()) {
            return Err(BudgetError::CategoryHasPlannedAmount {
                category_id: snapshot.id,
                amount,
            });
        }

        let children = if parent_id.is_none() {
            restore_level(snapshot.children, Some(snapshot.id), currency, seen)?
        } else if !snapshot.children.is_empty() {
            return Err(BudgetError::MaxDepthExceeded {
                parent_id: snapshot.id,
                max_depth: MAX_DEPTH,
            });
        } else {
            Vec::new()
        };

        level.push(BudgetCategory {
            id: snapshot.id,
            name,
            description: validate_description(snapshot.description.as_deref())?,
            parent_id,
            planned_amount: snapshot.planned_amount,
            display_order: snapshot.display_order,
            children,
        });
    }

    level.sort_by_key(|c| c.display_order);
    Ok(level)
}
