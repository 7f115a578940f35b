//! Budget service
//!
//! The command/query surface over the budget aggregate. Every command follows
//! the same path: load the budget with its stored version, run one aggregate
//! operation, stamp it, save it against the version it was loaded at, then
//! drain the raised events into the audit log.

use tracing::{debug, info};

use crate::audit::{AuditEntry, Auditor};
use crate::error::{BudgetError, HouseholdError, HouseholdResult};
use crate::models::{
    Budget, BudgetCategoryId, BudgetId, BudgetPeriod, BudgetStatus, Currency, Money, UserId,
};
use crate::storage::{Storage, VersionedBudget};

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
    auditor: &'a dyn Auditor,
}

/// One line of a budget listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetSummary {
    pub id: BudgetId,
    pub name: String,
    pub period: BudgetPeriod,
    pub currency: Currency,
    pub status: BudgetStatus,
    pub category_count: usize,
    pub planned_total: Money,
    pub version: u64,
}

impl BudgetSummary {
    fn from_versioned(versioned: &VersionedBudget) -> HouseholdResult<Self> {
        let budget = &versioned.budget;
        Ok(Self {
            id: budget.id(),
            name: budget.name().to_string(),
            period: budget.period(),
            currency: budget.currency(),
            status: budget.status(),
            category_count: budget.category_count(),
            planned_total: budget.planned_total()?,
            version: versioned.version,
        })
    }
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage, auditor: &'a dyn Auditor) -> Self {
        Self { storage, auditor }
    }

    // === Commands ===

    /// Create a new Draft budget owned by the acting user
    pub fn create_budget(
        &self,
        name: &str,
        year: i32,
        month: u32,
        currency: &str,
    ) -> HouseholdResult<Budget> {
        let mut budget = Budget::create(self.auditor.actor(), name, year, month, currency)?;
        self.auditor.stamp_created(budget.stamps_mut());

        self.storage.budgets.insert(&budget)?;
        self.storage.budgets.save()?;
        self.record_events(&mut budget)?;

        info!(
            budget_id = %budget.id(),
            "Created budget '{}' for {}",
            budget.name(),
            budget.period()
        );
        Ok(budget)
    }

    /// Add a root category, or a subcategory under `parent_id`
    pub fn add_category(
        &self,
        budget_id: BudgetId,
        name: &str,
        description: Option<&str>,
        parent_id: Option<BudgetCategoryId>,
    ) -> HouseholdResult<BudgetCategoryId> {
        let (_, category_id) = self.execute(budget_id, "add category", |budget| {
            budget.add_category(name, description, parent_id)
        })?;
        Ok(category_id)
    }

    pub fn rename_category(
        &self,
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        new_name: &str,
    ) -> HouseholdResult<Budget> {
        self.execute(budget_id, "rename category", |budget| {
            budget.rename_category(category_id, new_name)
        })
        .map(|(budget, _)| budget)
    }

    /// Set or clear (with `None`) a category description
    pub fn update_category_description(
        &self,
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        description: Option<&str>,
    ) -> HouseholdResult<Budget> {
        self.execute(budget_id, "update description", |budget| {
            budget.update_category_description(category_id, description)
        })
        .map(|(budget, _)| budget)
    }

    pub fn remove_category(
        &self,
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
    ) -> HouseholdResult<Budget> {
        self.execute(budget_id, "remove category", |budget| {
            budget.remove_category(category_id)
        })
        .map(|(budget, _)| budget)
    }

    /// Reorder the children of `parent_id` (or the roots, with `None`)
    pub fn reorder_categories(
        &self,
        budget_id: BudgetId,
        parent_id: Option<BudgetCategoryId>,
        order: &[BudgetCategoryId],
    ) -> HouseholdResult<Budget> {
        self.execute(budget_id, "reorder categories", |budget| {
            budget.reorder_categories(parent_id, order)
        })
        .map(|(budget, _)| budget)
    }

    pub fn set_planned_amount(
        &self,
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
        amount: Money,
    ) -> HouseholdResult<Budget> {
        self.execute(budget_id, "set planned amount", |budget| {
            budget.set_planned_amount(category_id, amount)
        })
        .map(|(budget, _)| budget)
    }

    pub fn clear_planned_amount(
        &self,
        budget_id: BudgetId,
        category_id: BudgetCategoryId,
    ) -> HouseholdResult<Budget> {
        self.execute(budget_id, "clear planned amount", |budget| {
            budget.clear_planned_amount(category_id)
        })
        .map(|(budget, _)| budget)
    }

    pub fn activate(&self, budget_id: BudgetId) -> HouseholdResult<Budget> {
        self.execute(budget_id, "activate", Budget::activate)
            .map(|(budget, _)| budget)
    }

    /// Delete a budget; the audit log keeps its final state
    pub fn delete_budget(&self, budget_id: BudgetId) -> HouseholdResult<Budget> {
        let VersionedBudget { budget, .. } = self.load(budget_id)?;

        self.storage.budgets.delete(budget_id)?;
        self.storage.budgets.save()?;
        self.storage.audit.log(&AuditEntry::budget_deleted(
            &budget,
            self.auditor.actor(),
            self.auditor.now(),
        ))?;

        info!(%budget_id, "Deleted budget '{}'", budget.name());
        Ok(budget)
    }

    // === Queries ===

    pub fn get(&self, budget_id: BudgetId) -> HouseholdResult<Option<Budget>> {
        Ok(self.storage.budgets.get(budget_id)?.map(|v| v.budget))
    }

    /// Find a budget by ID, short ID or name
    pub fn find(&self, identifier: &str) -> HouseholdResult<Option<Budget>> {
        Ok(self.storage.budgets.find(identifier)?.map(|v| v.budget))
    }

    /// Like [`find`](Self::find), but a missing budget is an error
    pub fn require(&self, identifier: &str) -> HouseholdResult<Budget> {
        self.find(identifier)?
            .ok_or_else(|| HouseholdError::budget_not_found(identifier))
    }

    /// Summaries of every budget belonging to `owner`, newest period first
    pub fn list_for_owner(&self, owner: UserId) -> HouseholdResult<Vec<BudgetSummary>> {
        self.storage
            .budgets
            .list_for_owner(owner)?
            .iter()
            .map(BudgetSummary::from_versioned)
            .collect()
    }

    /// Summaries of every stored budget, newest period first
    pub fn list_all(&self) -> HouseholdResult<Vec<BudgetSummary>> {
        self.storage
            .budgets
            .get_all()?
            .iter()
            .map(BudgetSummary::from_versioned)
            .collect()
    }

    /// Audit entries for one budget, oldest first
    pub fn history(&self, budget_id: BudgetId) -> HouseholdResult<Vec<AuditEntry>> {
        self.storage.audit.read_for_budget(budget_id)
    }

    // === Internals ===

    fn load(&self, budget_id: BudgetId) -> HouseholdResult<VersionedBudget> {
        self.storage
            .budgets
            .get(budget_id)?
            .ok_or_else(|| HouseholdError::budget_not_found(budget_id.to_string()))
    }

    /// Run one aggregate operation and persist the result
    ///
    /// Operations that raise no event (renaming to the current name) change
    /// nothing, so nothing is saved or logged.
    fn execute<T>(
        &self,
        budget_id: BudgetId,
        action: &str,
        operation: impl FnOnce(&mut Budget) -> Result<T, BudgetError>,
    ) -> HouseholdResult<(Budget, T)> {
        let VersionedBudget {
            mut budget,
            version,
        } = self.load(budget_id)?;

        let output = operation(&mut budget).map_err(|e| {
            debug!(%budget_id, code = e.code(), "Rejected {}: {}", action, e);
            e
        })?;

        if budget.pending_events().is_empty() {
            debug!(%budget_id, "Nothing changed for {}", action);
            return Ok((budget, output));
        }

        self.auditor.stamp_modified(budget.stamps_mut());
        let new_version = self.storage.budgets.update(&budget, version)?;
        self.storage.budgets.save()?;
        self.record_events(&mut budget)?;

        info!(%budget_id, version = new_version, "Applied {}", action);
        Ok((budget, output))
    }

    /// Drain pending events into the audit log
    fn record_events(&self, budget: &mut Budget) -> HouseholdResult<()> {
        let actor = self.auditor.actor();
        let now = self.auditor.now();
        let entries: Vec<_> = budget
            .take_events()
            .iter()
            .map(|event| AuditEntry::from_event(event, actor, now))
            .collect();

        self.storage.audit.log_batch(&entries)
    }
}

/// Resolve a category within a budget by `Parent/Child` path, short ID or name
///
/// A bare name must identify exactly one category across the whole tree. A
/// path takes precedence over a category whose own name contains a slash.
pub fn find_category(budget: &Budget, identifier: &str) -> HouseholdResult<BudgetCategoryId> {
    let identifier = identifier.trim();
    let not_found = || HouseholdError::NotFound {
        entity_type: "Category",
        identifier: identifier.to_string(),
    };

    // Names may contain '/', so a failed path lookup falls back to the name
    if let Some((parent, child)) = identifier.split_once('/') {
        let by_path = budget
            .categories()
            .iter()
            .find(|c| c.has_name(parent.trim()))
            .and_then(|parent| parent.children().iter().find(|c| c.has_name(child.trim())));
        if let Some(category) = by_path {
            return Ok(category.id());
        }
    }

    if let Some(category) = budget
        .all_categories()
        .find(|c| c.id().matches_short(identifier))
    {
        return Ok(category.id());
    }

    let mut by_name = budget.all_categories().filter(|c| c.has_name(identifier));
    match (by_name.next(), by_name.next()) {
        (Some(category), None) => Ok(category.id()),
        (Some(_), Some(_)) => Err(HouseholdError::Validation(format!(
            "More than one category is named '{}'; use Parent/Child",
            identifier
        ))),
        (None, _) => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{FixedAuditor, Operation};
    use crate::config::paths::HouseholdPaths;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn auditor() -> FixedAuditor {
        FixedAuditor::new(
            UserId::new(),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        )
    }

    fn zar(amount: i64) -> Money {
        Money::of(Decimal::new(amount, 0), "ZAR").unwrap()
    }

    #[test]
    fn test_create_budget_is_stamped_and_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("June", 2024, 6, "zar").unwrap();

        assert_eq!(budget.owner(), auditor.actor());
        assert_eq!(budget.currency().code(), "ZAR");
        assert_eq!(budget.stamps().created_by, Some(auditor.actor()));
        assert_eq!(budget.stamps().created_at, Some(auditor.now()));
        assert!(budget.pending_events().is_empty());

        let history = service.history(budget.id()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event, "budget_created");
    }

    #[test]
    fn test_create_budget_rejects_bad_input() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let err = service.create_budget("June", 2024, 13, "ZAR").unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "budget.invalid_period");

        assert!(service.create_budget("June", 2024, 6, "XYZ").is_err());
        assert!(service.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_groceries_scenario() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("Household", 2024, 6, "ZAR").unwrap();
        let food = service
            .add_category(budget.id(), "Food", None, None)
            .unwrap();
        let groceries = service
            .add_category(budget.id(), "Groceries-2024-06", None, Some(food))
            .unwrap();
        let updated = service
            .set_planned_amount(budget.id(), groceries, zar(450))
            .unwrap();

        assert_eq!(updated.planned_total().unwrap(), zar(450));

        let events: Vec<_> = service
            .history(budget.id())
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(
            events,
            vec![
                "budget_created",
                "category_added",
                "category_added",
                "planned_amount_set"
            ]
        );

        let stored = service.get(budget.id()).unwrap().unwrap();
        assert_eq!(stored.category(groceries).unwrap().planned_amount(), Some(zar(450)));
    }

    #[test]
    fn test_rejected_command_changes_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("Household", 2024, 6, "ZAR").unwrap();
        service.add_category(budget.id(), "Food", None, None).unwrap();

        let err = service
            .add_category(budget.id(), "food", None, None)
            .unwrap_err();
        assert_eq!(
            err.as_domain().unwrap().code(),
            "budget.duplicate_category_name"
        );

        assert_eq!(service.get(budget.id()).unwrap().unwrap().category_count(), 1);
        assert_eq!(service.history(budget.id()).unwrap().len(), 2);
        assert_eq!(storage.budgets.get(budget.id()).unwrap().unwrap().version, 2);
    }

    #[test]
    fn test_noop_rename_is_not_saved() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("Household", 2024, 6, "ZAR").unwrap();
        let food = service.add_category(budget.id(), "Food", None, None).unwrap();

        service.rename_category(budget.id(), food, "Food").unwrap();

        assert_eq!(storage.budgets.get(budget.id()).unwrap().unwrap().version, 2);
        assert_eq!(service.history(budget.id()).unwrap().len(), 2);
    }

    #[test]
    fn test_activation_freezes_structure() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("Household", 2024, 6, "ZAR").unwrap();
        let rent = service.add_category(budget.id(), "Rent", None, None).unwrap();

        let err = service.activate(budget.id()).unwrap_err();
        assert_eq!(err.as_domain().unwrap().code(), "budget.activation_validation");

        service
            .set_planned_amount(budget.id(), rent, zar(8000))
            .unwrap();
        let active = service.activate(budget.id()).unwrap();
        assert_eq!(active.status(), BudgetStatus::Active);

        let err = service
            .add_category(budget.id(), "Fuel", None, None)
            .unwrap_err();
        assert_eq!(
            err.as_domain().unwrap().code(),
            "budget.invalid_status_transition"
        );

        service
            .set_planned_amount(budget.id(), rent, zar(8500))
            .unwrap();
        service
            .update_category_description(budget.id(), rent, Some("flat"))
            .unwrap();
    }

    #[test]
    fn test_remove_and_reorder() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("Household", 2024, 6, "ZAR").unwrap();
        let food = service.add_category(budget.id(), "Food", None, None).unwrap();
        let rent = service.add_category(budget.id(), "Rent", None, None).unwrap();
        let fuel = service.add_category(budget.id(), "Fuel", None, None).unwrap();

        let reordered = service
            .reorder_categories(budget.id(), None, &[fuel, food, rent])
            .unwrap();
        let names: Vec<_> = reordered.categories().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Fuel", "Food", "Rent"]);

        service.set_planned_amount(budget.id(), rent, zar(10)).unwrap();
        assert!(service.remove_category(budget.id(), rent).is_err());
        service.clear_planned_amount(budget.id(), rent).unwrap();
        let after = service.remove_category(budget.id(), rent).unwrap();
        assert_eq!(after.category_count(), 2);
    }

    #[test]
    fn test_unknown_budget_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let err = service.activate(BudgetId::new()).unwrap_err();
        assert!(err.is_not_found());
        assert!(service.require("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_budget_is_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let budget = service.create_budget("Household", 2024, 6, "ZAR").unwrap();
        service.delete_budget(budget.id()).unwrap();

        assert!(service.get(budget.id()).unwrap().is_none());
        let history = service.history(budget.id()).unwrap();
        assert_eq!(history.last().unwrap().operation, Operation::Delete);
    }

    #[test]
    fn test_list_summaries() {
        let (_temp_dir, storage) = create_test_storage();
        let auditor = auditor();
        let service = BudgetService::new(&storage, &auditor);

        let june = service.create_budget("June", 2024, 6, "ZAR").unwrap();
        service.create_budget("July", 2024, 7, "ZAR").unwrap();
        let food = service.add_category(june.id(), "Food", None, None).unwrap();
        service.set_planned_amount(june.id(), food, zar(100)).unwrap();

        let summaries = service.list_for_owner(auditor.actor()).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "July");
        assert_eq!(summaries[1].planned_total, zar(100));
        assert_eq!(summaries[1].category_count, 1);
        assert_eq!(summaries[1].version, 3);

        assert!(service.list_for_owner(UserId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_find_category() {
        let mut budget = Budget::create(UserId::new(), "Home", 2024, 6, "ZAR").unwrap();
        let food = budget.add_category("Food", None, None).unwrap();
        let home = budget.add_category("Home", None, None).unwrap();
        let food_misc = budget.add_category("Misc", None, Some(food)).unwrap();
        budget.add_category("Misc", None, Some(home)).unwrap();

        assert_eq!(find_category(&budget, "food").unwrap(), food);
        assert_eq!(find_category(&budget, "Food/Misc").unwrap(), food_misc);
        assert_eq!(find_category(&budget, &food.to_string()).unwrap(), food);
        assert!(matches!(
            find_category(&budget, "Misc"),
            Err(HouseholdError::Validation(_))
        ));
        assert!(find_category(&budget, "Fuel").unwrap_err().is_not_found());
        assert!(find_category(&budget, "Food/Fuel").unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_category_with_slash_in_name() {
        let mut budget = Budget::create(UserId::new(), "Home", 2024, 6, "ZAR").unwrap();
        let car = budget.add_category("Car", None, None).unwrap();
        let fuel = budget.add_category("Fuel", None, Some(car)).unwrap();
        let tolls = budget.add_category("Tolls/Parking", None, None).unwrap();
        let car_fuel = budget.add_category("Car/Fuel", None, None).unwrap();

        assert_eq!(find_category(&budget, "Tolls/Parking").unwrap(), tolls);
        assert_eq!(find_category(&budget, "tolls/parking").unwrap(), tolls);
        assert_eq!(find_category(&budget, "Car/Fuel").unwrap(), fuel);
        assert_eq!(find_category(&budget, &car_fuel.to_string()).unwrap(), car_fuel);
    }
}
