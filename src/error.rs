//! Error types for the household budget crate
//!
//! Two layers are defined here. [`BudgetError`] is the domain error returned
//! by every operation on the budget aggregate; it is a plain value with a
//! stable machine code and a classification. [`HouseholdError`] is the
//! application error used by storage, services and the CLI, and wraps
//! domain failures alongside I/O and serialization problems.

use thiserror::Error;

use crate::models::{BudgetCategoryId, BudgetId, BudgetStatus, InvalidPeriodError, Money, MoneyError};

/// Broad classification of a domain failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input had the wrong shape (empty name, bad period, foreign currency)
    Validation,
    /// The category tree would be violated (depth, duplicate names, children)
    Structural,
    /// The operation is not allowed in the budget's current status
    State,
    /// A referenced identifier does not exist
    NotFound,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Structural => write!(f, "structural"),
            ErrorKind::State => write!(f, "state"),
            ErrorKind::NotFound => write!(f, "not-found"),
        }
    }
}

/// Failure of an operation on the budget aggregate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BudgetError {
    #[error(transparent)]
    InvalidPeriod(#[from] InvalidPeriodError),

    #[error("Unrecognized currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    #[error("Invalid description: {reason}")]
    InvalidDescription { reason: String },

    #[error("Invalid amount for category {category_id}: {reason}")]
    InvalidAmount {
        category_id: BudgetCategoryId,
        reason: String,
    },

    #[error("A category named '{name}' already exists at this level")]
    DuplicateCategoryName {
        name: String,
        parent_id: Option<BudgetCategoryId>,
    },

    #[error("Cannot add a category under {parent_id}: categories nest at most {max_depth} levels deep")]
    MaxDepthExceeded {
        parent_id: BudgetCategoryId,
        max_depth: usize,
    },

    #[error("Category {category_id} still has {child_count} subcategories")]
    CategoryHasChildren {
        category_id: BudgetCategoryId,
        child_count: usize,
    },

    #[error("Category {category_id} still has a planned amount of {amount}; clear it first")]
    CategoryHasPlannedAmount {
        category_id: BudgetCategoryId,
        amount: Money,
    },

    #[error("Cannot {operation} while the budget is {status}")]
    InvalidStatusTransition {
        status: BudgetStatus,
        operation: &'static str,
    },

    #[error("Budget cannot be activated: {reason}")]
    ActivationValidation { reason: String },

    #[error("Category not found: {0}")]
    CategoryNotFound(BudgetCategoryId),

    #[error("Category {0} appears more than once in the tree")]
    DuplicateCategoryId(BudgetCategoryId),

    #[error("Invalid category ordering: {reason}")]
    InvalidOrdering { reason: String },

    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl BudgetError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod(_) => "budget.invalid_period",
            Self::InvalidCurrency(_) => "budget.invalid_currency",
            Self::InvalidName { .. } => "budget.invalid_name",
            Self::InvalidDescription { .. } => "budget.invalid_description",
            Self::InvalidAmount { .. } => "budget.invalid_amount",
            Self::DuplicateCategoryName { .. } => "budget.duplicate_category_name",
            Self::MaxDepthExceeded { .. } => "budget.max_depth_exceeded",
            Self::CategoryHasChildren { .. } => "budget.category_has_children",
            Self::CategoryHasPlannedAmount { .. } => "budget.category_has_planned_amount",
            Self::InvalidStatusTransition { .. } => "budget.invalid_status_transition",
            Self::ActivationValidation { .. } => "budget.activation_validation",
            Self::CategoryNotFound(_) => "budget.category_not_found",
            Self::DuplicateCategoryId(_) => "budget.duplicate_category_id",
            Self::InvalidOrdering { .. } => "budget.invalid_ordering",
            Self::Money(MoneyError::CurrencyMismatch { .. }) => "money.currency_mismatch",
            Self::Money(MoneyError::DivisionByZero) => "money.division_by_zero",
            Self::Money(MoneyError::Overflow) => "money.overflow",
        }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPeriod(_)
            | Self::InvalidCurrency(_)
            | Self::InvalidName { .. }
            | Self::InvalidDescription { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidOrdering { .. }
            | Self::Money(_) => ErrorKind::Validation,
            Self::DuplicateCategoryName { .. }
            | Self::DuplicateCategoryId(_)
            | Self::MaxDepthExceeded { .. }
            | Self::CategoryHasChildren { .. }
            | Self::CategoryHasPlannedAmount { .. } => ErrorKind::Structural,
            Self::InvalidStatusTransition { .. } | Self::ActivationValidation { .. } => {
                ErrorKind::State
            }
            Self::CategoryNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// The main error type for application-level operations
#[derive(Error, Debug)]
pub enum HouseholdError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Input that could not be turned into a domain value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected by the budget aggregate
    #[error("{0}")]
    Domain(#[from] BudgetError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The stored budget changed since it was loaded
    #[error("Budget {budget_id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        budget_id: BudgetId,
        expected: u64,
        actual: u64,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl HouseholdError {
    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error, including domain lookups
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Domain(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// The domain error, if the aggregate rejected the operation
    pub fn as_domain(&self) -> Option<&BudgetError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HouseholdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<MoneyError> for HouseholdError {
    fn from(err: MoneyError) -> Self {
        Self::Domain(BudgetError::Money(err))
    }
}

impl From<serde_json::Error> for HouseholdError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for application-level operations
pub type HouseholdResult<T> = Result<T, HouseholdError>;
