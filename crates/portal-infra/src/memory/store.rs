use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use portal_core::domain::{
    Category, CategoryType, Location, LocationFilter, LocationSort, Page, PageRequest, Post,
    PostFilter, PostSort, Sort, SortDirection, User, UserRole,
};
use portal_core::error::RepoError;
use portal_core::ports::{
    BaseRepository, CategoryRepository, LocationRepository, PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
}

impl Tables {
    fn check_category_ref(&self, category_id: Uuid) -> Result<(), RepoError> {
        if self.categories.contains_key(&category_id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!(
                "category {category_id} does not exist"
            )))
        }
    }

    fn check_category_unique(&self, category: &Category) -> Result<(), RepoError> {
        let clash = self.categories.values().any(|c| {
            c.id != category.id
                && c.name == category.name
                && c.category_type == category.category_type
        });
        if clash {
            return Err(RepoError::Constraint(format!(
                "category ({}, {}) already exists",
                category.name, category.category_type
            )));
        }
        Ok(())
    }

    fn check_username_unique(&self, user: &User) -> Result<(), RepoError> {
        if self
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        Ok(())
    }

    fn references(&self, category_id: Uuid) -> u64 {
        let locations = self
            .locations
            .values()
            .filter(|l| l.category_id == category_id)
            .count();
        let posts = self
            .posts
            .values()
            .filter(|p| p.category_id == category_id)
            .count();
        (locations + posts) as u64
    }
}

/// In-memory implementation of every repository port.
///
/// All tables sit behind one async `RwLock`, so each write (including the
/// view counter increment) is atomic with respect to every other access.
/// Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn sort_locations(items: &mut [Location], sort: Sort<LocationSort>) {
    items.sort_by(|a, b| {
        let primary = match sort.field {
            LocationSort::Name => a.name.cmp(&b.name),
            LocationSort::Address => a.address.cmp(&b.address),
            LocationSort::CreatedAt => a.created_at.cmp(&b.created_at),
            LocationSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        directed(primary, sort.direction).then_with(|| a.name.cmp(&b.name))
    });
}

fn sort_posts(items: &mut [Post], sort: Sort<PostSort>) {
    items.sort_by(|a, b| {
        let primary = match sort.field {
            PostSort::PublishedAt => a.published_at.cmp(&b.published_at),
            PostSort::CreatedAt => a.created_at.cmp(&b.created_at),
            PostSort::ViewCount => a.view_count.cmp(&b.view_count),
            PostSort::Title => a.title.cmp(&b.title),
        };
        directed(primary, sort.direction).then_with(|| b.published_at.cmp(&a.published_at))
    });
}

fn by_name(items: &mut [Category]) {
    items.sort_by(|a, b| a.name.cmp(&b.name));
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, entity: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_category_unique(&entity)?;
        tables.categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_category_unique(&entity)?;
        tables.categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.references(id) > 0 {
            return Err(RepoError::Constraint(format!(
                "category {id} is still referenced"
            )));
        }
        Ok(tables.categories.remove(&id).is_some())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.read().await.categories.contains_key(&id))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list(&self, category_type: Option<CategoryType>) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| category_type.is_none_or(|t| c.category_type == t))
            .cloned()
            .collect();
        by_name(&mut items);
        Ok(items)
    }

    async fn search_by_name(
        &self,
        query: &str,
        category_type: Option<CategoryType>,
    ) -> Result<Vec<Category>, RepoError> {
        let query = query.to_lowercase();
        let tables = self.tables.read().await;
        let mut items: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| category_type.is_none_or(|t| c.category_type == t))
            .filter(|c| c.name.to_lowercase().contains(&query))
            .cloned()
            .collect();
        by_name(&mut items);
        Ok(items)
    }

    async fn find_by_name_and_type(
        &self,
        name: &str,
        category_type: CategoryType,
    ) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.name == name && c.category_type == category_type)
            .cloned())
    }

    async fn find_with_entries(
        &self,
        category_type: CategoryType,
    ) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.category_type == category_type)
            .filter(|c| match category_type {
                CategoryType::Location => tables.locations.values().any(|l| l.category_id == c.id),
                CategoryType::Post => tables.posts.values().any(|p| p.category_id == c.id),
            })
            .cloned()
            .collect();
        by_name(&mut items);
        Ok(items)
    }

    async fn count_references(&self, id: Uuid) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.references(id))
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.retain(|_, l| l.category_id != id);
        tables.posts.retain(|_, p| p.category_id != id);
        Ok(tables.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn insert(&self, entity: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_category_ref(entity.category_id)?;
        tables.locations.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.locations.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_category_ref(entity.category_id)?;
        tables.locations.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.locations.remove(&id).is_some())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.read().await.locations.contains_key(&id))
    }
}

impl InMemoryStore {
    async fn matching_locations(
        &self,
        filter: &LocationFilter,
        sort: Sort<LocationSort>,
    ) -> Vec<Location> {
        let tables = self.tables.read().await;
        let mut items: Vec<Location> = tables
            .locations
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        sort_locations(&mut items, sort);
        items
    }

    async fn matching_posts(&self, filter: &PostFilter, sort: Sort<PostSort>) -> Vec<Post> {
        let tables = self.tables.read().await;
        let mut items: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        sort_posts(&mut items, sort);
        items
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn page(
        &self,
        filter: &LocationFilter,
        request: PageRequest<LocationSort>,
    ) -> Result<Page<Location>, RepoError> {
        let items = self.matching_locations(filter, request.sort).await;
        Ok(Page::from_ordered(items, &request))
    }

    async fn list(
        &self,
        filter: &LocationFilter,
        sort: Sort<LocationSort>,
    ) -> Result<Vec<Location>, RepoError> {
        Ok(self.matching_locations(filter, sort).await)
    }

    async fn count(&self, filter: &LocationFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.locations.values().filter(|l| filter.matches(l)).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_category_ref(entity.category_id)?;
        tables.posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_category_ref(entity.category_id)?;
        tables.posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.posts.remove(&id).is_some())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.read().await.posts.contains_key(&id))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn page(
        &self,
        filter: &PostFilter,
        request: PageRequest<PostSort>,
    ) -> Result<Page<Post>, RepoError> {
        let items = self.matching_posts(filter, request.sort).await;
        Ok(Page::from_ordered(items, &request))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        sort: Sort<PostSort>,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, RepoError> {
        let mut items = self.matching_posts(filter, sort).await;
        if let Some(limit) = limit {
            items.truncate(limit as usize);
        }
        Ok(items)
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&id) {
            Some(post) => {
                post.view_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_username_unique(&entity)?;
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_username_unique(&entity)?;
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username && u.is_active)
            .cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_by_role(&self, role: UserRole) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.is_active).count() as u64)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.username == username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::domain::CategoryInput;

    fn category(name: &str, category_type: CategoryType) -> Category {
        Category::new(CategoryInput {
            name: name.to_string(),
            category_type,
            description: None,
            icon: None,
        })
    }

    #[tokio::test]
    async fn test_duplicate_category_is_a_constraint_violation() {
        let store = InMemoryStore::new();
        store.insert(category("Y tế", CategoryType::Location)).await.unwrap();

        let result = store.insert(category("Y tế", CategoryType::Location)).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));

        // Same name, other type is fine.
        assert!(store.insert(category("Y tế", CategoryType::Post)).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update(category("Giáo dục", CategoryType::Post)).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
