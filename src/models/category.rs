//! Budget categories
//!
//! Categories form a two-level tree inside a budget: root categories and, at
//! most, one level of subcategories beneath them. A category's `parent_id` is
//! only a back-reference; the parent owns the child through `children`.
//!
//! Categories are created and mutated exclusively through [`Budget`]
//! (see `models::budget`), which is why nothing here is publicly mutable.
//!
//! [`Budget`]: super::Budget

use serde::Serialize;
use std::fmt;

use super::ids::BudgetCategoryId;
use super::money::Money;
use crate::error::BudgetError;

/// Maximum category name length in characters
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 250;

/// Maximum depth of the category tree (roots count as depth 1)
pub const MAX_DEPTH: usize = 2;

/// A category within a budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetCategory {
    pub(crate) id: BudgetCategoryId,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) parent_id: Option<BudgetCategoryId>,
    pub(crate) planned_amount: Option<Money>,
    pub(crate) display_order: i32,
    pub(crate) children: Vec<BudgetCategory>,
}

impl BudgetCategory {
    pub(crate) fn new(
        name: String,
        description: Option<String>,
        parent_id: Option<BudgetCategoryId>,
        display_order: i32,
    ) -> Self {
        Self {
            id: BudgetCategoryId::new(),
            name,
            description,
            parent_id,
            planned_amount: None,
            display_order,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> BudgetCategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The owning root category, if this is a subcategory
    pub fn parent_id(&self) -> Option<BudgetCategoryId> {
        self.parent_id
    }

    pub fn planned_amount(&self) -> Option<Money> {
        self.planned_amount
    }

    pub fn display_order(&self) -> i32 {
        self.display_order
    }

    /// Subcategories in display order
    pub fn children(&self) -> &[BudgetCategory] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// 1 for root categories, 2 for subcategories
    pub fn depth(&self) -> usize {
        if self.is_root() {
            1
        } else {
            2
        }
    }

    /// Case-insensitive name comparison used for sibling uniqueness
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Trim and validate a category name
pub fn validate_category_name(name: &str) -> Result<String, BudgetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BudgetError::InvalidName {
            reason: "category name cannot be empty".into(),
        });
    }

    let len = name.chars().count();
    if len > MAX_CATEGORY_NAME_LEN {
        return Err(BudgetError::InvalidName {
            reason: format!(
                "category name too long ({} chars, max {})",
                len, MAX_CATEGORY_NAME_LEN
            ),
        });
    }

    Ok(name.to_string())
}

/// Trim and validate an optional description; blank becomes `None`
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, BudgetError> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(BudgetError::InvalidDescription {
            reason: format!(
                "description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
        });
    }

    Ok(Some(description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category_is_root_leaf() {
        let category = BudgetCategory::new("Food".into(), None, None, 0);
        assert!(category.is_root());
        assert!(category.is_leaf());
        assert_eq!(category.depth(), 1);
        assert!(category.planned_amount().is_none());
    }

    #[test]
    fn test_subcategory_depth() {
        let root = BudgetCategory::new("Food".into(), None, None, 0);
        let child = BudgetCategory::new("Groceries".into(), None, Some(root.id()), 0);
        assert!(!child.is_root());
        assert_eq!(child.depth(), 2);
        assert_eq!(child.parent_id(), Some(root.id()));
    }

    #[test]
    fn test_has_name_is_case_insensitive() {
        let category = BudgetCategory::new("Dining Out".into(), None, None, 0);
        assert!(category.has_name("dining out"));
        assert!(category.has_name("DINING OUT"));
        assert!(!category.has_name("Dining"));
    }

    #[test]
    fn test_validate_category_name() {
        assert_eq!(validate_category_name("  Rent ").unwrap(), "Rent");
        assert!(matches!(
            validate_category_name("   "),
            Err(BudgetError::InvalidName { .. })
        ));
        assert!(validate_category_name(&"a".repeat(50)).is_ok());
        assert!(validate_category_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert_eq!(validate_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_description(Some(" weekly shop ")).unwrap(),
            Some("weekly shop".to_string())
        );
        assert!(matches!(
            validate_description(Some(&"x".repeat(251))),
            Err(BudgetError::InvalidDescription { .. })
        ));
    }
}
