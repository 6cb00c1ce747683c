//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;
use uuid::Uuid;

use portal_core::domain::{Actor, UserRole};
use portal_core::ports::{AuthError, TokenClaims, TokenService};
use portal_shared::ErrorResponse;

use crate::observability::current_request_id;

/// Authenticated caller, decoded from the bearer token. Taking it as a
/// handler argument makes the route answer 401 without a valid token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl Identity {
    /// The caller as seen by the service layer.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.username.clone(), self.role)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(pub AuthError);

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::HashingError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::unauthorized()
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => ErrorResponse::unauthorized().with_detail(msg.clone()),
            AuthError::MissingAuth | AuthError::InvalidCredentials => {
                ErrorResponse::unauthorized().with_detail(
                    "Please provide a valid Bearer token in the Authorization header.",
                )
            }
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
        };
        let error = match current_request_id() {
            Some(request_id) => error.with_request_id(request_id),
            None => error,
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let auth_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    token_service.validate_token(token.trim()).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|e| {
            tracing::warn!(error = %e, path = %req.path(), "Rejected request credentials");
            AuthenticationError(e)
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
