//! HS256 bearer tokens for portal staff.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_core::domain::UserRole;
use portal_core::ports::{AuthError, TokenClaims, TokenService};

const DEV_SECRET: &str = "portal-dev-secret";

/// Signing settings, filled from `JWT_*` variables by the server.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "portal-api".to_string(),
        }
    }
}

impl JwtConfig {
    fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }
}

/// Wire form of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct StaffClaims {
    sub: Uuid,
    username: String,
    role: UserRole,
    iss: String,
    iat: i64,
    exp: i64,
}

impl From<StaffClaims> for TokenClaims {
    fn from(claims: StaffClaims) -> Self {
        TokenClaims {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            exp: claims.exp,
        }
    }
}

/// Issues and checks the tokens handed out by `/api/auth/login`.
pub struct JwtTokenService {
    keys: (EncodingKey, DecodingKey),
    validation: Validation,
    lifetime: TimeDelta,
    issuer: String,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        if config.uses_dev_secret() {
            let production = std::env::var("RUST_ENV")
                .is_ok_and(|env| matches!(env.as_str(), "production" | "prod"));
            if production {
                tracing::error!("JWT_SECRET is unset, staff tokens are signed with the development secret");
            } else {
                tracing::warn!("JWT_SECRET is unset, using the development secret");
            }
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            keys: (
                EncodingKey::from_secret(config.secret.as_bytes()),
                DecodingKey::from_secret(config.secret.as_bytes()),
            ),
            validation,
            lifetime: TimeDelta::hours(config.expiration_hours),
            issuer: config.issuer,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        let claims = StaffClaims {
            sub: user_id,
            username: username.to_owned(),
            role,
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.keys.0)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<StaffClaims>(token, &self.keys.1, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    fn expiration_seconds(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(issuer: &str, expiration_hours: i64) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            expiration_hours,
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn test_token_carries_username_and_role() {
        let tokens = service("portal-test", 1);
        let user_id = Uuid::new_v4();

        let token = tokens
            .generate_token(user_id, "admin", UserRole::SuperAdmin)
            .unwrap();
        let claims = tokens.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, UserRole::SuperAdmin);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = service("portal-test", 1).validate_token("not.a.token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_token_from_another_issuer_is_rejected() {
        let token = service("cong-thong-tin", 1)
            .generate_token(Uuid::new_v4(), "bientap", UserRole::Admin)
            .unwrap();

        assert!(service("portal-test", 1).validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let tokens = service("portal-test", -2);
        let token = tokens
            .generate_token(Uuid::new_v4(), "admin", UserRole::Admin)
            .unwrap();

        assert!(matches!(tokens.validate_token(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_expires_in_matches_configured_hours() {
        assert_eq!(service("portal-test", 24).expiration_seconds(), 86_400);
    }
}
