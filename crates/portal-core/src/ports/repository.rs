use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryType, Location, LocationFilter, LocationSort, Page, PageRequest, Post,
    PostFilter, PostSort, Sort, User, UserRole,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if the row is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Returns whether a row was removed.
    async fn delete(&self, id: ID) -> Result<bool, RepoError>;

    async fn exists(&self, id: ID) -> Result<bool, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, optionally of one type, ordered by name.
    async fn list(&self, category_type: Option<CategoryType>) -> Result<Vec<Category>, RepoError>;

    /// Case-insensitive substring match on the name, ordered by name.
    async fn search_by_name(
        &self,
        query: &str,
        category_type: Option<CategoryType>,
    ) -> Result<Vec<Category>, RepoError>;

    async fn find_by_name_and_type(
        &self,
        name: &str,
        category_type: CategoryType,
    ) -> Result<Option<Category>, RepoError>;

    /// Categories of `category_type` referenced by at least one location or post.
    async fn find_with_entries(
        &self,
        category_type: CategoryType,
    ) -> Result<Vec<Category>, RepoError>;

    /// Number of locations and posts (active or not) referencing the category.
    async fn count_references(&self, id: Uuid) -> Result<u64, RepoError>;

    /// Remove the category and every location and post referencing it, atomically.
    async fn delete_cascade(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Location repository.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    async fn page(
        &self,
        filter: &LocationFilter,
        request: PageRequest<LocationSort>,
    ) -> Result<Page<Location>, RepoError>;

    async fn list(
        &self,
        filter: &LocationFilter,
        sort: Sort<LocationSort>,
    ) -> Result<Vec<Location>, RepoError>;

    async fn count(&self, filter: &LocationFilter) -> Result<u64, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn page(
        &self,
        filter: &PostFilter,
        request: PageRequest<PostSort>,
    ) -> Result<Page<Post>, RepoError>;

    async fn list(
        &self,
        filter: &PostFilter,
        sort: Sort<PostSort>,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, RepoError>;

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Atomically add one to the view counter. Returns false if the post does not exist.
    async fn increment_view_count(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// All users, newest first.
    async fn list_newest_first(&self) -> Result<Vec<User>, RepoError>;

    async fn find_by_role(&self, role: UserRole) -> Result<Vec<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn count_active(&self) -> Result<u64, RepoError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError>;
}
