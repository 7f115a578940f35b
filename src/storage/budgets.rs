//! Budget repository for JSON storage
//!
//! Keeps budgets.json in memory as [`BudgetRecord`]s and hands out hydrated
//! [`Budget`]s together with the version they were read at. Writes go through
//! [`BudgetRepository::update`], which refuses a stale version.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

use super::file_io::{read_json, write_json_atomic};
use super::records::{BudgetData, BudgetRecord, SCHEMA_VERSION};
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Budget, BudgetId, UserId};

/// A budget together with the stored version it was loaded at
#[derive(Debug, Clone)]
pub struct VersionedBudget {
    pub budget: Budget,
    pub version: u64,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetId, BudgetRecord>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> HouseholdResult<()> {
        let file_data: BudgetData = read_json(&self.path)?;
        if file_data.schema_version > SCHEMA_VERSION {
            return Err(HouseholdError::Storage(format!(
                "{} has schema version {}, newer than supported version {}",
                self.path.display(),
                file_data.schema_version,
                SCHEMA_VERSION
            )));
        }

        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        budgets.clear();
        for record in file_data.budgets {
            budgets.insert(record.id, record);
        }

        debug!("Loaded {} budgets from {}", budgets.len(), self.path.display());
        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> HouseholdResult<()> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(|a, b| (&a.period, &a.name).cmp(&(&b.period, &b.name)));

        let file_data = BudgetData {
            schema_version: SCHEMA_VERSION,
            budgets: list,
        };

        write_json_atomic(&self.path, &file_data)?;
        debug!("Saved {} budgets to {}", budgets.len(), self.path.display());
        Ok(())
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> HouseholdResult<Option<VersionedBudget>> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        budgets.get(&id).map(hydrate).transpose()
    }

    /// Get all budgets, newest period first
    pub fn get_all(&self) -> HouseholdResult<Vec<VersionedBudget>> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list = budgets
            .values()
            .map(hydrate)
            .collect::<HouseholdResult<Vec<_>>>()?;
        sort_for_listing(&mut list);
        Ok(list)
    }

    /// Get all budgets belonging to one owner, newest period first
    pub fn list_for_owner(&self, owner: UserId) -> HouseholdResult<Vec<VersionedBudget>> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list = budgets
            .values()
            .filter(|r| r.owner == owner)
            .map(hydrate)
            .collect::<HouseholdResult<Vec<_>>>()?;
        sort_for_listing(&mut list);
        Ok(list)
    }

    /// Find a budget by full ID, short ID (`bud-xxxxxxxx`) or name
    ///
    /// Names are matched case-insensitively and must be unambiguous.
    pub fn find(&self, identifier: &str) -> HouseholdResult<Option<VersionedBudget>> {
        let identifier = identifier.trim();
        let budgets = self
            .budgets
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        if let Ok(id) = identifier.parse::<BudgetId>() {
            if let Some(record) = budgets.get(&id) {
                return hydrate(record).map(Some);
            }
        }

        if let Some(record) = budgets.values().find(|r| r.id.matches_short(identifier)) {
            return hydrate(record).map(Some);
        }

        let name_lower = identifier.to_lowercase();
        let mut by_name = budgets
            .values()
            .filter(|r| r.name.to_lowercase() == name_lower);

        match (by_name.next(), by_name.next()) {
            (Some(record), None) => hydrate(record).map(Some),
            (Some(_), Some(_)) => Err(HouseholdError::Validation(format!(
                "More than one budget is named '{}'; use its ID instead",
                identifier
            ))),
            (None, _) => Ok(None),
        }
    }

    /// Insert a new budget at version 1
    pub fn insert(&self, budget: &Budget) -> HouseholdResult<u64> {
        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if budgets.contains_key(&budget.id()) {
            return Err(HouseholdError::Storage(format!(
                "Budget {} already exists",
                budget.id()
            )));
        }

        budgets.insert(budget.id(), BudgetRecord::from_budget(budget, 1));
        debug!("Inserted budget {}", budget.id());
        Ok(1)
    }

    /// Replace a stored budget, provided nobody saved it since `expected_version`
    ///
    /// Returns the new version.
    pub fn update(&self, budget: &Budget, expected_version: u64) -> HouseholdResult<u64> {
        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let current = budgets
            .get(&budget.id())
            .ok_or_else(|| HouseholdError::budget_not_found(budget.id().to_string()))?;

        if current.version != expected_version {
            return Err(HouseholdError::Conflict {
                budget_id: budget.id(),
                expected: expected_version,
                actual: current.version,
            });
        }

        let version = expected_version + 1;
        budgets.insert(budget.id(), BudgetRecord::from_budget(budget, version));
        debug!("Updated budget {} to version {}", budget.id(), version);
        Ok(version)
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> HouseholdResult<bool> {
        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(budgets.remove(&id).is_some())
    }

    /// Count budgets
    pub fn count(&self) -> HouseholdResult<usize> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(budgets.len())
    }
}

fn hydrate(record: &BudgetRecord) -> HouseholdResult<VersionedBudget> {
    Ok(VersionedBudget {
        budget: record.to_budget()?,
        version: record.version,
    })
}

fn sort_for_listing(list: &mut [VersionedBudget]) {
    list.sort_by(|a, b| {
        b.budget
            .period()
            .cmp(&a.budget.period())
            .then_with(|| a.budget.name().cmp(b.budget.name()))
    });
}
