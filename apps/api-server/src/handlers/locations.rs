//! Location handlers. Reads are public, writes need a bearer token.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use portal_core::domain::{GeoBounds, LocationPatch, LocationSort, NewLocation, Sort};
use portal_shared::dto::{CountResponse, MessageResponse};

use super::params::{PageParams, non_blank};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    category_id: Option<Uuid>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsQuery {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

/// GET /api/locations?categoryId=&search=&page=&size=&sortBy=&sortDir=
pub async fn list(
    state: web::Data<AppState>,
    filter: web::Query<LocationQuery>,
    paging: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let request = paging.to_request(DEFAULT_PAGE_SIZE, Sort::asc(LocationSort::Name))?;
    let page = match (filter.category_id, non_blank(&filter.search)) {
        (category_id, Some(search)) => state.locations.search(search, category_id, request).await?,
        (Some(category_id), None) => state.locations.list_by_category(category_id, request).await?,
        (None, None) => state.locations.list_active(request).await?,
    };
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/locations/simple?categoryId=&search=
pub async fn list_simple(
    state: web::Data<AppState>,
    filter: web::Query<LocationQuery>,
) -> AppResult<HttpResponse> {
    let locations = match (filter.category_id, non_blank(&filter.search)) {
        (category_id, Some(search)) => state.locations.search_all(search, category_id).await?,
        (Some(category_id), None) => state.locations.list_by_category_all(category_id).await?,
        (None, None) => state.locations.list_active_all().await?,
    };
    Ok(HttpResponse::Ok().json(locations))
}

/// GET /api/locations/with-coordinates
pub async fn with_coordinates(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.locations.with_coordinates().await?))
}

/// GET /api/locations/with-phone
pub async fn with_phone(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.locations.with_phone().await?))
}

/// GET /api/locations/bounds?minLat=&maxLat=&minLng=&maxLng=
pub async fn within_bounds(
    state: web::Data<AppState>,
    query: web::Query<BoundsQuery>,
) -> AppResult<HttpResponse> {
    let bounds = GeoBounds::new(query.min_lat, query.max_lat, query.min_lng, query.max_lng)?;
    Ok(HttpResponse::Ok().json(state.locations.within_bounds(bounds).await?))
}

/// GET /api/locations/category/{categoryId}/count
pub async fn count_by_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let count = state.locations.count_by_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// GET /api/locations/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.locations.get(path.into_inner()).await?))
}

/// POST /api/locations
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<NewLocation>,
) -> AppResult<HttpResponse> {
    let location = state.locations.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(location))
}

/// PUT /api/locations/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<LocationPatch>,
) -> AppResult<HttpResponse> {
    let location = state
        .locations
        .update(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(location))
}

/// DELETE /api/locations/{id} - hides the location, keeping the row.
pub async fn soft_delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.locations.soft_delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Đã ẩn địa điểm")))
}

/// DELETE /api/locations/{id}/permanent
pub async fn delete_permanently(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.locations.delete_permanently(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Đã xóa địa điểm")))
}
