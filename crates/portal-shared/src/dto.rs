//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Outcome of a login attempt. Token fields are only present on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl LoginResponse {
    pub fn success(user: UserResponse, access_token: String, expires_in: i64) -> Self {
        Self {
            success: true,
            message: "Đăng nhập thành công".to_string(),
            user: Some(user),
            access_token: Some(access_token),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(expires_in),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user: None,
            access_token: None,
            token_type: None,
            expires_in: None,
        }
    }
}

/// Result of `GET /api/auth/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

/// Public view of a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to change a password. `old_password` is required for one's own account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub total_users: u64,
    pub active_users: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_login_omits_token_fields() {
        let json = serde_json::to_value(LoginResponse::failure("Sai mật khẩu")).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("accessToken").is_none());
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_change_password_old_password_is_optional() {
        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"newPassword": "matkhaumoi"}"#).unwrap();
        assert!(req.old_password.is_none());
    }
}
