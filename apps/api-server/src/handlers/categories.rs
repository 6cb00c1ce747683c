//! Category handlers. Reads are public, writes need a bearer token.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use portal_core::DomainError;
use portal_core::domain::{CategoryInput, CategoryType, DeletePolicy};
use portal_shared::dto::{ExistsResponse, MessageResponse};

use super::params::non_blank;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    #[serde(rename = "type")]
    category_type: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithDataQuery {
    #[serde(default)]
    with_data: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    name: String,
    #[serde(rename = "type")]
    category_type: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    force: bool,
}

fn parse_type(raw: &Option<String>) -> Result<Option<CategoryType>, DomainError> {
    non_blank(raw).map(str::parse).transpose()
}

/// GET /api/categories?type=&search=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<CategoryListQuery>,
) -> AppResult<HttpResponse> {
    let category_type = parse_type(&query.category_type)?;
    let categories = match non_blank(&query.search) {
        Some(search) => state.categories.search(search, category_type).await?,
        None => state.categories.list(category_type).await?,
    };
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/categories/locations?withData=
pub async fn location_categories(
    state: web::Data<AppState>,
    query: web::Query<WithDataQuery>,
) -> AppResult<HttpResponse> {
    of_type(&state, CategoryType::Location, query.with_data).await
}

/// GET /api/categories/posts?withData=
pub async fn post_categories(
    state: web::Data<AppState>,
    query: web::Query<WithDataQuery>,
) -> AppResult<HttpResponse> {
    of_type(&state, CategoryType::Post, query.with_data).await
}

async fn of_type(
    state: &AppState,
    category_type: CategoryType,
    with_data: bool,
) -> AppResult<HttpResponse> {
    let categories = if with_data {
        state.categories.with_entries(category_type).await?
    } else {
        state.categories.list(Some(category_type)).await?
    };
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/categories/check?name=&type=
pub async fn check(
    state: web::Data<AppState>,
    query: web::Query<CheckQuery>,
) -> AppResult<HttpResponse> {
    let category_type: CategoryType = query.category_type.parse()?;
    let exists = state
        .categories
        .exists_by_name_and_type(&query.name, category_type)
        .await?;
    Ok(HttpResponse::Ok().json(ExistsResponse { exists }))
}

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category = state.categories.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CategoryInput>,
) -> AppResult<HttpResponse> {
    let category = state.categories.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(category))
}

/// PUT /api/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CategoryInput>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .update(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

/// DELETE /api/categories/{id}?force=
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    query: web::Query<DeleteQuery>,
) -> AppResult<HttpResponse> {
    remove(&state, &identity, path.into_inner(), DeletePolicy::from_force(query.force)).await
}

/// DELETE /api/categories/{id}/force
pub async fn force_delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    remove(&state, &identity, path.into_inner(), DeletePolicy::Cascade).await
}

async fn remove(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    policy: DeletePolicy,
) -> AppResult<HttpResponse> {
    state.categories.delete(id, policy).await?;
    tracing::info!(category_id = %id, ?policy, by = %identity.username, "Category removed via API");
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Đã xóa danh mục")))
}
