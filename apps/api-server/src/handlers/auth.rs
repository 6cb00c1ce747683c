//! Authentication handlers.

use actix_web::{HttpResponse, web};

use portal_core::DomainError;
use portal_shared::dto::{AuthCheckResponse, LoginRequest, LoginResponse, MessageResponse};

use super::users::user_response;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const LOGIN_FAILED: &str = "Tên đăng nhập hoặc mật khẩu không đúng";

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(LoginResponse::failure("Vui lòng nhập tên đăng nhập và mật khẩu")));
    }

    let Some(user) = state.users.authenticate(&req.username, &req.password).await? else {
        return Ok(HttpResponse::Unauthorized().json(LoginResponse::failure(LOGIN_FAILED)));
    };

    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    Ok(HttpResponse::Ok().json(LoginResponse::success(
        user_response(user),
        token,
        state.tokens.expiration_seconds(),
    )))
}

/// POST /api/auth/logout
///
/// Tokens are stateless, so the client simply discards its copy.
pub async fn logout(identity: OptionalIdentity) -> HttpResponse {
    if let Some(identity) = identity.0 {
        tracing::info!(user_id = %identity.user_id, "User logged out");
    }
    HttpResponse::Ok().json(MessageResponse::ok("Đăng xuất thành công"))
}

/// GET /api/auth/check - never fails with 401.
///
/// A token for a deleted account reads as unauthenticated. Storage
/// failures still surface as 500.
pub async fn check(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let user = match identity.0 {
        Some(identity) => match state.users.current(&identity.actor()).await {
            Ok(user) => Some(user),
            Err(DomainError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    Ok(HttpResponse::Ok().json(AuthCheckResponse {
        authenticated: user.is_some(),
        user: user.map(user_response),
    }))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .current(&identity.actor())
        .await
        .map_err(|e| match e {
            DomainError::NotFound { .. } => {
                AppError::Unauthorized("The account behind this token no longer exists".to_string())
            }
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(user_response(user)))
}
