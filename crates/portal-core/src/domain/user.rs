use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::Patch;
use super::validate::{max_len, not_blank};
use crate::error::DomainError;

/// Administrative roles. `SuperAdmin` manages accounts, both manage content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(UserRole::SuperAdmin),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(DomainError::validation(format!(
                "Invalid role '{s}', expected SUPER_ADMIN or ADMIN"
            ))),
        }
    }
}

/// User entity - an administrative account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub const MAX_USERNAME_LEN: usize = 50;
    pub const MAX_FULL_NAME_LEN: usize = 100;
    pub const MAX_EMAIL_LEN: usize = 100;

    /// Create a new active user with generated ID and timestamps.
    pub fn new(
        username: String,
        password_hash: String,
        full_name: Option<String>,
        email: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            full_name,
            email,
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}

fn validate_profile(full_name: Option<&str>, email: Option<&str>) -> Result<(), DomainError> {
    max_len("fullName", full_name, User::MAX_FULL_NAME_LEN)?;
    max_len("email", email, User::MAX_EMAIL_LEN)
}

/// Create payload for a user account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: UserRole,
}

impl NewUser {
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn validate(&self) -> Result<(), DomainError> {
        let username = self.username.trim();
        not_blank("username", username)?;
        max_len("username", Some(username), User::MAX_USERNAME_LEN)?;
        validate_profile(self.full_name.as_deref(), self.email.as_deref())?;
        validate_password(&self.password)
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < NewUser::MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {} characters",
            NewUser::MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Partial update for a user profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub full_name: Patch<String>,
    pub email: Patch<String>,
    pub role: Patch<UserRole>,
    pub is_active: Patch<bool>,
}

impl UserPatch {
    /// Whether the patch touches fields reserved for super admins.
    pub fn touches_privileged_fields(&self) -> bool {
        !self.role.is_absent() || !self.is_active.is_absent()
    }

    pub fn apply_to(self, user: &mut User) -> Result<(), DomainError> {
        self.full_name.apply(&mut user.full_name);
        self.email.apply(&mut user.email);
        self.role.apply_required(&mut user.role, "role")?;
        self.is_active.apply_required(&mut user.is_active, "isActive")?;
        validate_profile(user.full_name.as_deref(), user.email.as_deref())?;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("super_admin".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
        assert!("EDITOR".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new(
            "bientap".to_string(),
            "$argon2id$secret".to_string(),
            None,
            None,
            UserRole::Admin,
        );
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "ADMIN");
    }

    #[test]
    fn test_new_user_lengths_match_column_widths() {
        let mut input = NewUser {
            username: "a".repeat(User::MAX_USERNAME_LEN),
            password: "matkhau123".to_string(),
            full_name: Some("Đ".repeat(User::MAX_FULL_NAME_LEN)),
            email: None,
            role: UserRole::Admin,
        };
        assert!(input.validate().is_ok());

        input.username.push('a');
        assert!(matches!(input.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_patch_rejects_overlong_email() {
        let mut user = User::new("bientap".to_string(), "hash".to_string(), None, None, UserRole::Admin);
        let patch = UserPatch {
            email: Patch::Value(format!("{}@mongcai.gov.vn", "x".repeat(100))),
            ..UserPatch::default()
        };
        assert!(matches!(patch.apply_to(&mut user), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_patch_detects_privileged_fields() {
        let patch: UserPatch = serde_json::from_str(r#"{"fullName": "Nguyễn Văn A"}"#).unwrap();
        assert!(!patch.touches_privileged_fields());
        let patch: UserPatch = serde_json::from_str(r#"{"role": "SUPER_ADMIN"}"#).unwrap();
        assert!(patch.touches_privileged_fields());
    }
}
