//! Storage layer
//!
//! JSON file storage with atomic writes and automatic directory creation,
//! plus the append-only audit log living alongside it.

pub mod budgets;
pub mod file_io;
pub mod records;

pub use budgets::{BudgetRepository, VersionedBudget};
pub use file_io::{read_json, write_json_atomic};
pub use records::{BudgetRecord, CategoryRecord};

use crate::audit::AuditLogger;
use crate::config::paths::HouseholdPaths;
use crate::error::HouseholdError;

/// Storage coordinator that provides access to the repositories
pub struct Storage {
    paths: HouseholdPaths,
    pub budgets: BudgetRepository,
    pub audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: HouseholdPaths) -> Result<Self, HouseholdError> {
        paths.ensure_directories()?;

        Ok(Self {
            budgets: BudgetRepository::new(paths.budgets_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Open storage and load everything from disk
    pub fn open(paths: HouseholdPaths) -> Result<Self, HouseholdError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &HouseholdPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), HouseholdError> {
        self.budgets.load()
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), HouseholdError> {
        self.budgets.save()
    }
}
