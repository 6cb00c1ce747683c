//! Application services - business rules on top of the repository ports.

mod category;
mod location;
mod post;
mod user;

pub use category::CategoryService;
pub use location::LocationService;
pub use post::PostService;
pub use user::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, UserService};

use uuid::Uuid;

use crate::domain::{Category, CategoryType};
use crate::error::{DomainError, DomainResult};
use crate::ports::CategoryRepository;

/// Resolve a category reference, requiring it to exist with the expected type.
pub(crate) async fn require_category(
    categories: &dyn CategoryRepository,
    id: Uuid,
    expected: CategoryType,
) -> DomainResult<Category> {
    let category = categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::validation(format!("Category {id} does not exist")))?;
    if category.category_type != expected {
        return Err(DomainError::validation(format!(
            "Category {id} has type {}, expected {expected}",
            category.category_type
        )));
    }
    Ok(category)
}
