//! Post handlers. Reads are public, writes need a bearer token.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use portal_core::PostService;
use portal_core::domain::{NewPost, PostPatch, PostSort, Sort};
use portal_shared::dto::{CountResponse, MessageResponse};

use super::params::{PageParams, non_blank, parse_datetime};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    category_id: Option<Uuid>,
    search: Option<String>,
    featured: Option<bool>,
    urgent: Option<bool>,
    author: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularQuery {
    min_views: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TopViewedQuery {
    page: Option<u64>,
    size: Option<u64>,
}

/// GET /api/posts
///
/// One filter applies, in this order: category, search, featured, urgent,
/// author, a date range, a start date. Without any the full listing is used.
pub async fn list(
    state: web::Data<AppState>,
    filter: web::Query<PostQuery>,
    paging: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let request = paging.to_request(DEFAULT_PAGE_SIZE, Sort::desc(PostSort::PublishedAt))?;
    let posts = &state.posts;

    let page = if let Some(category_id) = filter.category_id {
        posts.by_category(category_id, request).await?
    } else if let Some(search) = non_blank(&filter.search) {
        posts.search(search, request).await?
    } else if filter.featured == Some(true) {
        posts.featured(request).await?
    } else if filter.urgent == Some(true) {
        posts.urgent(request).await?
    } else if let Some(author) = non_blank(&filter.author) {
        posts.by_author(author, request).await?
    } else if let Some(start) = non_blank(&filter.start_date) {
        let start = parse_datetime("startDate", start)?;
        match non_blank(&filter.end_date) {
            Some(end) => {
                let end = parse_datetime("endDate", end)?;
                posts.published_between(start, end, request).await?
            }
            None => posts.published_after(start, request).await?,
        }
    } else {
        posts.list(request).await?
    };

    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/posts/featured?limit=3
pub async fn featured(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let limit = query.limit.unwrap_or(PostService::DEFAULT_FEATURED_LIMIT);
    Ok(HttpResponse::Ok().json(state.posts.latest_featured(limit).await?))
}

/// GET /api/posts/urgent
pub async fn urgent(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.urgent_all().await?))
}

/// GET /api/posts/recent
pub async fn recent(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.recent().await?))
}

/// GET /api/posts/popular?minViews=10
pub async fn popular(
    state: web::Data<AppState>,
    query: web::Query<PopularQuery>,
) -> AppResult<HttpResponse> {
    let min_views = query
        .min_views
        .unwrap_or(PostService::DEFAULT_POPULAR_MIN_VIEWS);
    Ok(HttpResponse::Ok().json(state.posts.popular(min_views).await?))
}

/// GET /api/posts/top-viewed?page=&size=
pub async fn top_viewed(
    state: web::Data<AppState>,
    query: web::Query<TopViewedQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .top_viewed(query.page.unwrap_or(0), query.size.unwrap_or(DEFAULT_PAGE_SIZE))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/posts/category/{categoryId}/latest?limit=5
pub async fn latest_in_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(PostService::DEFAULT_CATEGORY_LATEST_LIMIT);
    let posts = state
        .posts
        .latest_in_category(path.into_inner(), limit)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/category/{categoryId}/count
pub async fn count_by_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let count = state.posts.count_by_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// GET /api/posts/stats
pub async fn stats(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.stats().await?))
}

/// GET /api/posts/{id} - counts a view.
pub async fn view(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.view(path.into_inner()).await?))
}

/// GET /api/posts/{id}/preview
pub async fn preview(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.preview(path.into_inner()).await?))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<NewPost>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostPatch>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Đã xóa bài viết")))
}
