//! Category taxonomy
//!
//! Categories own subcategories; both are ordered by `sort_order`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Subcategory, always attached to exactly one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub category_id: Uuid,
}

/// A category together with its subcategories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithSubcategories {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

impl CategoryWithSubcategories {
    /// Attach subcategories, keeping only those that reference this category
    pub fn assemble(category: Category, subcategories: &[Subcategory]) -> Self {
        let subcategories = subcategories
            .iter()
            .filter(|sub| sub.category_id == category.id)
            .cloned()
            .collect();

        Self {
            category,
            subcategories,
        }
    }

    /// Drop inactive subcategories and order the rest
    fn normalize(mut self) -> Self {
        self.subcategories.retain(|sub| sub.is_active);
        self.subcategories
            .sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        self
    }
}

/// Order a directory for display.
///
/// Inactive categories and subcategories are removed. Categories are sorted
/// by `sort_order` ascending with name as tiebreak, and so are the nested
/// subcategories.
pub fn order_directory(entries: Vec<CategoryWithSubcategories>) -> Vec<CategoryWithSubcategories> {
    let mut entries: Vec<_> = entries
        .into_iter()
        .filter(|entry| entry.category.is_active)
        .map(CategoryWithSubcategories::normalize)
        .collect();

    entries.sort_by(|a, b| {
        a.category
            .sort_order
            .cmp(&b.category.sort_order)
            .then_with(|| a.category.name.cmp(&b.category.name))
    });

    entries
}

/// Normalize a single entry looked up by slug (inactive → None)
pub fn visible_category(entry: CategoryWithSubcategories) -> Option<CategoryWithSubcategories> {
    if entry.category.is_active {
        Some(entry.normalize())
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(name: &str, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            icon: "tag".to_string(),
            description: None,
            is_active: true,
            sort_order,
        }
    }

    pub fn subcategory(category: &Category, name: &str, sort_order: i32) -> Subcategory {
        Subcategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: None,
            is_active: true,
            sort_order,
            category_id: category.id,
        }
    }
}
