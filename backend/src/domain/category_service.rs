//! User-defined categories.
//!
//! Custom categories extend the built-in lists for the user who created
//! them. The picker shows the built-in list for the transaction kind first,
//! then the user's own additions.

use anyhow::Result;
use log::info;
use shared::{default_categories, CustomCategory, TransactionKind};

use crate::domain::errors::ValidationError;
use crate::storage::{CategoryStore, Connection};

/// Service managing user-defined categories
#[derive(Clone)]
pub struct CategoryService<C: Connection> {
    connection: C,
}

impl<C: Connection> CategoryService<C> {
    /// Create a new category service
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Add a category for the given user
    pub async fn add_category(&self, owner: &str, name: &str) -> Result<CustomCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategoryName.into());
        }

        let repository = self.connection.create_category_repository();

        let existing = repository.list_by_owner(owner).await?;
        if existing.iter().any(|c| c.name == name) {
            return Err(ValidationError::DuplicateCategory.into());
        }

        let category = CustomCategory::new(name, owner);
        repository.store_category(&category).await?;

        info!("🏷️ Added custom category '{}' for {}", name, owner);
        Ok(category)
    }

    /// The user's custom categories, in creation order
    pub async fn custom_categories(&self, owner: &str) -> Result<Vec<CustomCategory>> {
        let repository = self.connection.create_category_repository();
        repository.list_by_owner(owner).await
    }

    /// Every category name available in the picker for one transaction kind:
    /// the built-in list first, then the user's additions
    pub async fn categories_for(&self, owner: &str, kind: TransactionKind) -> Result<Vec<String>> {
        let mut names: Vec<String> = default_categories(kind)
            .iter()
            .map(|name| name.to_string())
            .collect();

        for custom in self.custom_categories(owner).await? {
            if !names.contains(&custom.name) {
                names.push(custom.name);
            }
        }

        Ok(names)
    }
}
