//! User administration handlers. Every route requires a bearer token.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use portal_core::domain::{NewUser, User, UserPatch, UserRole};
use portal_shared::dto::{ChangePasswordRequest, MessageResponse, UserResponse, UserStatsResponse};

use super::params::non_blank;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(super) fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        email: user.email,
        role: user.role.to_string(),
        is_active: user.is_active,
        last_login: user.last_login,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    role: Option<String>,
}

/// GET /api/users?role=
pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    let role = non_blank(&query.role).map(str::parse::<UserRole>).transpose()?;
    let users = state.users.list(&identity.actor(), role).await?;
    let body: Vec<UserResponse> = users.into_iter().map(user_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/stats
pub async fn stats(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let (total_users, active_users) = state.users.counts(&identity.actor()).await?;
    Ok(HttpResponse::Ok().json(UserStatsResponse {
        total_users,
        active_users,
    }))
}

/// GET /api/users/{id}
pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state.users.get(&identity.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// POST /api/users
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<NewUser>,
) -> AppResult<HttpResponse> {
    let user = state.users.create(&identity.actor(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user_response(user)))
}

/// PUT /api/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UserPatch>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .update(&identity.actor(), path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// PUT /api/users/{id}/password
pub async fn change_password(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state
        .users
        .change_password(
            &identity.actor(),
            path.into_inner(),
            req.old_password.as_deref(),
            &req.new_password,
        )
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Đổi mật khẩu thành công")))
}

/// PUT /api/users/{id}/toggle-active
pub async fn toggle_active(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .toggle_active(&identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// DELETE /api/users/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.users.delete(&identity.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Đã xóa người dùng")))
}
