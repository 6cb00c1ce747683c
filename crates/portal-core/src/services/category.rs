use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Category, CategoryInput, CategoryType, DeletePolicy};
use crate::error::{DomainError, DomainResult};
use crate::ports::CategoryRepository;

/// Category management.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// All categories, or only those of one type, ordered by name.
    pub async fn list(&self, category_type: Option<CategoryType>) -> DomainResult<Vec<Category>> {
        Ok(self.categories.list(category_type).await?)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// Name search. A blank query lists everything.
    pub async fn search(
        &self,
        query: &str,
        category_type: Option<CategoryType>,
    ) -> DomainResult<Vec<Category>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(category_type).await;
        }
        Ok(self.categories.search_by_name(query, category_type).await?)
    }

    /// Categories of a type that have at least one location or post.
    pub async fn with_entries(&self, category_type: CategoryType) -> DomainResult<Vec<Category>> {
        Ok(self.categories.find_with_entries(category_type).await?)
    }

    pub async fn create(&self, input: CategoryInput) -> DomainResult<Category> {
        input.validate()?;
        self.ensure_unique(input.name.trim(), input.category_type, None)
            .await?;

        let category = self.categories.insert(Category::new(input)).await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Replace name, type, description and icon.
    pub async fn update(&self, id: Uuid, input: CategoryInput) -> DomainResult<Category> {
        input.validate()?;
        let mut category = self.get(id).await?;
        self.ensure_unique(input.name.trim(), input.category_type, Some(id))
            .await?;

        category.apply(input);
        let category = self.categories.update(category).await?;
        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid, policy: DeletePolicy) -> DomainResult<()> {
        if !self.categories.exists(id).await? {
            return Err(DomainError::not_found("Category", id));
        }

        let removed = match policy {
            DeletePolicy::Restrict => {
                let references = self.categories.count_references(id).await?;
                if references > 0 {
                    return Err(DomainError::Conflict(format!(
                        "Category {id} is still used by {references} location(s) or post(s)"
                    )));
                }
                self.categories.delete(id).await?
            }
            DeletePolicy::Cascade => self.categories.delete_cascade(id).await?,
        };

        if !removed {
            return Err(DomainError::not_found("Category", id));
        }
        info!(category_id = %id, ?policy, "Category deleted");
        Ok(())
    }

    pub async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.categories.exists(id).await?)
    }

    pub async fn exists_by_name_and_type(
        &self,
        name: &str,
        category_type: CategoryType,
    ) -> DomainResult<bool> {
        Ok(self
            .categories
            .find_by_name_and_type(name.trim(), category_type)
            .await?
            .is_some())
    }

    async fn ensure_unique(
        &self,
        name: &str,
        category_type: CategoryType,
        current: Option<Uuid>,
    ) -> DomainResult<()> {
        let existing = self
            .categories
            .find_by_name_and_type(name, category_type)
            .await?;
        match existing {
            Some(other) if Some(other.id) != current => {
                debug!(name, %category_type, "Category name already taken");
                Err(DomainError::Duplicate(format!(
                    "Category '{name}' of type {category_type} already exists"
                )))
            }
            _ => Ok(()),
        }
    }
}
