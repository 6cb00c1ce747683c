use uuid::Uuid;

use super::user::UserRole;
use crate::error::DomainError;

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    pub fn is_self(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn require_super_admin(&self) -> Result<(), DomainError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "this action requires the SUPER_ADMIN role".to_string(),
            ))
        }
    }

    pub fn require_self_or_super_admin(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.is_self(user_id) || self.is_super_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "cannot access another user's account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_may_only_touch_own_account() {
        let actor = Actor::new(Uuid::new_v4(), "bientap", UserRole::Admin);
        assert!(actor.require_self_or_super_admin(actor.user_id).is_ok());
        assert!(matches!(
            actor.require_self_or_super_admin(Uuid::new_v4()),
            Err(DomainError::Forbidden(_))
        ));
        assert!(actor.require_super_admin().is_err());
    }

    #[test]
    fn test_super_admin_passes_every_gate() {
        let actor = Actor::new(Uuid::new_v4(), "admin", UserRole::SuperAdmin);
        assert!(actor.require_super_admin().is_ok());
        assert!(actor.require_self_or_super_admin(Uuid::new_v4()).is_ok());
    }
}
