//! PostgreSQL repository implementations.

use std::ops::Bound;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use portal_core::domain::{
    Category, CategoryType, Location, LocationFilter, LocationSort, Page, PageRequest, Post,
    PostFilter, PostSort, Sort, SortDirection, User, UserRole, row_offset,
};
use portal_core::error::RepoError;
use portal_core::ports::{CategoryRepository, LocationRepository, PostRepository, UserRepository};

use super::entity::category::{self, CategoryKind, Entity as CategoryEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity, Role};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

fn order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

/// `LOWER(col) LIKE '%query%'`
fn contains_ci(col: impl IntoColumnRef, query: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(format!("%{}%", query.to_lowercase()))
}

async fn fetch_page<E>(
    db: &sea_orm::DbConn,
    select: Select<E>,
    page: u64,
    size: u64,
) -> Result<Page<E::Model>, RepoError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = select.paginate(db, size);
    let totals = paginator.num_items_and_pages().await.map_err(map_db_err)?;
    // The paginator multiplies page by size unchecked.
    let content = match row_offset(page, size) {
        Some(offset) if offset < totals.number_of_items => {
            paginator.fetch_page(page).await.map_err(map_db_err)?
        }
        _ => Vec::new(),
    };
    Ok(Page::new(content, page, size, totals.number_of_items))
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self, category_type: Option<CategoryType>) -> Result<Vec<Category>, RepoError> {
        let mut select = CategoryEntity::find();
        if let Some(category_type) = category_type {
            select = select.filter(category::Column::Kind.eq(CategoryKind::from(category_type)));
        }
        let models = select
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn search_by_name(
        &self,
        query: &str,
        category_type: Option<CategoryType>,
    ) -> Result<Vec<Category>, RepoError> {
        debug!(query, "Searching categories by name");

        let mut select = CategoryEntity::find().filter(contains_ci(category::Column::Name, query));
        if let Some(category_type) = category_type {
            select = select.filter(category::Column::Kind.eq(CategoryKind::from(category_type)));
        }
        let models = select
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_name_and_type(
        &self,
        name: &str,
        category_type: CategoryType,
    ) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .filter(category::Column::Kind.eq(CategoryKind::from(category_type)))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_with_entries(
        &self,
        category_type: CategoryType,
    ) -> Result<Vec<Category>, RepoError> {
        let referencing = match category_type {
            CategoryType::Location => Query::select()
                .column(location::Column::CategoryId)
                .from(LocationEntity)
                .to_owned(),
            CategoryType::Post => Query::select()
                .column(post::Column::CategoryId)
                .from(PostEntity)
                .to_owned(),
        };

        let models = CategoryEntity::find()
            .filter(category::Column::Kind.eq(CategoryKind::from(category_type)))
            .filter(category::Column::Id.in_subquery(referencing))
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_references(&self, id: Uuid) -> Result<u64, RepoError> {
        let locations = LocationEntity::find()
            .filter(location::Column::CategoryId.eq(id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        let posts = PostEntity::find()
            .filter(post::Column::CategoryId.eq(id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(locations + posts)
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let locations = LocationEntity::delete_many()
            .filter(location::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let posts = PostEntity::delete_many()
            .filter(post::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let category = CategoryEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        debug!(
            category_id = %id,
            locations = locations.rows_affected,
            posts = posts.rows_affected,
            "Category removed with dependents"
        );
        Ok(category.rows_affected > 0)
    }
}

fn location_condition(filter: &LocationFilter) -> Condition {
    let mut condition = Condition::all();
    if filter.active_only {
        condition = condition.add(location::Column::IsActive.eq(true));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(location::Column::CategoryId.eq(category_id));
    }
    if let Some(query) = &filter.search {
        condition = condition.add(
            Condition::any()
                .add(contains_ci(location::Column::Name, query))
                .add(contains_ci(location::Column::Address, query)),
        );
    }
    if let Some(bounds) = filter.bounds {
        condition = condition
            .add(location::Column::Latitude.between(bounds.min_lat, bounds.max_lat))
            .add(location::Column::Longitude.between(bounds.min_lng, bounds.max_lng));
    }
    if filter.with_phone {
        condition = condition
            .add(location::Column::Phone.is_not_null())
            .add(location::Column::Phone.ne(""));
    }
    if filter.with_coordinates {
        condition = condition
            .add(location::Column::Latitude.is_not_null())
            .add(location::Column::Longitude.is_not_null());
    }
    condition
}

fn location_select(filter: &LocationFilter, sort: Sort<LocationSort>) -> Select<LocationEntity> {
    let column = match sort.field {
        LocationSort::Name => location::Column::Name,
        LocationSort::Address => location::Column::Address,
        LocationSort::CreatedAt => location::Column::CreatedAt,
        LocationSort::UpdatedAt => location::Column::UpdatedAt,
    };
    let mut select = LocationEntity::find()
        .filter(location_condition(filter))
        .order_by(column, order(sort.direction));
    if sort.field != LocationSort::Name {
        select = select.order_by_asc(location::Column::Name);
    }
    select
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn page(
        &self,
        filter: &LocationFilter,
        request: PageRequest<LocationSort>,
    ) -> Result<Page<Location>, RepoError> {
        debug!(?filter, page = request.page, size = request.size, "Paging locations");

        let select = location_select(filter, request.sort);
        let page = fetch_page(self.db.as_ref(), select, request.page, request.size).await?;
        Ok(page.map(Into::into))
    }

    async fn list(
        &self,
        filter: &LocationFilter,
        sort: Sort<LocationSort>,
    ) -> Result<Vec<Location>, RepoError> {
        let models = location_select(filter, sort)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &LocationFilter) -> Result<u64, RepoError> {
        LocationEntity::find()
            .filter(location_condition(filter))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}

fn post_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if let Some(featured) = filter.featured {
        condition = condition.add(post::Column::IsFeatured.eq(featured));
    }
    if let Some(urgent) = filter.urgent {
        condition = condition.add(post::Column::IsUrgent.eq(urgent));
    }
    if let Some(author) = &filter.author {
        condition = condition.add(post::Column::Author.eq(author.as_str()));
    }
    match filter.published.0 {
        Bound::Included(start) => condition = condition.add(post::Column::PublishedAt.gte(start)),
        Bound::Excluded(start) => condition = condition.add(post::Column::PublishedAt.gt(start)),
        Bound::Unbounded => {}
    }
    match filter.published.1 {
        Bound::Included(end) => condition = condition.add(post::Column::PublishedAt.lte(end)),
        Bound::Excluded(end) => condition = condition.add(post::Column::PublishedAt.lt(end)),
        Bound::Unbounded => {}
    }
    if let Some(min_views) = filter.min_views_exclusive {
        condition = condition.add(post::Column::ViewCount.gt(min_views));
    }
    if let Some(query) = &filter.search {
        condition = condition.add(
            Condition::any()
                .add(contains_ci(post::Column::Title, query))
                .add(contains_ci(post::Column::Content, query))
                .add(contains_ci(post::Column::Summary, query)),
        );
    }
    condition
}

fn post_select(filter: &PostFilter, sort: Sort<PostSort>) -> Select<PostEntity> {
    let column = match sort.field {
        PostSort::PublishedAt => post::Column::PublishedAt,
        PostSort::CreatedAt => post::Column::CreatedAt,
        PostSort::ViewCount => post::Column::ViewCount,
        PostSort::Title => post::Column::Title,
    };
    let mut select = PostEntity::find()
        .filter(post_condition(filter))
        .order_by(column, order(sort.direction));
    if sort.field != PostSort::PublishedAt {
        select = select.order_by_desc(post::Column::PublishedAt);
    }
    select
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn page(
        &self,
        filter: &PostFilter,
        request: PageRequest<PostSort>,
    ) -> Result<Page<Post>, RepoError> {
        debug!(?filter, page = request.page, size = request.size, "Paging posts");

        let select = post_select(filter, request.sort);
        let page = fetch_page(self.db.as_ref(), select, request.page, request.size).await?;
        Ok(page.map(Into::into))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        sort: Sort<PostSort>,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, RepoError> {
        let mut select = post_select(filter, sort);
        if let Some(limit) = limit {
            select = select.limit(limit);
        }
        let models = select.all(self.db.as_ref()).await.map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post_condition(filter))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::IsActive.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_newest_first(&self) -> Result<Vec<User>, RepoError> {
        let models = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_role(&self, role: UserRole) -> Result<Vec<User>, RepoError> {
        let models = UserEntity::find()
            .filter(user::Column::Role.eq(Role::from(role)))
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(self.db.as_ref()).await.map_err(map_db_err)
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        UserEntity::find()
            .filter(user::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError> {
        let count = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }
}
