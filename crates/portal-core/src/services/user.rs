use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Actor, NewUser, Patch, User, UserPatch, UserRole, validate_password};
use crate::error::{DomainError, DomainResult};
use crate::ports::{PasswordService, UserRepository};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_FULL_NAME: &str = "Quản trị viên";
const DEFAULT_ADMIN_EMAIL: &str = "admin@mongcai.gov.vn";

/// Administrative accounts and credential checks.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Check credentials against an active account.
    ///
    /// A mismatch, unknown username or inactive account yields `Ok(None)`.
    /// On success the login time is recorded.
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<Option<User>> {
        let Some(mut user) = self.users.find_active_by_username(username.trim()).await? else {
            warn!(username, "Login attempt for unknown or inactive user");
            return Ok(None);
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            warn!(username, "Login attempt with wrong password");
            return Ok(None);
        }

        user.last_login = Some(Utc::now());
        let user = self.users.update(user).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(Some(user))
    }

    /// Create the default super admin unless the `admin` username exists.
    pub async fn bootstrap_default_admin(&self) -> DomainResult<Option<User>> {
        if self.users.exists_by_username(DEFAULT_ADMIN_USERNAME).await? {
            return Ok(None);
        }

        let user = User::new(
            DEFAULT_ADMIN_USERNAME.to_string(),
            self.passwords.hash(DEFAULT_ADMIN_PASSWORD)?,
            Some(DEFAULT_ADMIN_FULL_NAME.to_string()),
            Some(DEFAULT_ADMIN_EMAIL.to_string()),
            UserRole::SuperAdmin,
        );
        let user = self.users.insert(user).await?;
        warn!(
            username = DEFAULT_ADMIN_USERNAME,
            "Default admin account created, change its password"
        );
        Ok(Some(user))
    }

    pub async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.users.find_by_username(username.trim()).await?)
    }

    pub async fn exists_by_username(&self, username: &str) -> DomainResult<bool> {
        Ok(self.users.exists_by_username(username.trim()).await?)
    }

    /// Load the account behind an authenticated identity.
    pub async fn current(&self, actor: &Actor) -> DomainResult<User> {
        self.find(actor.user_id).await
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> DomainResult<User> {
        actor.require_self_or_super_admin(id)?;
        self.find(id).await
    }

    /// All users newest first, or only those holding `role`.
    pub async fn list(&self, actor: &Actor, role: Option<UserRole>) -> DomainResult<Vec<User>> {
        actor.require_super_admin()?;
        let users = match role {
            Some(role) => self.users.find_by_role(role).await?,
            None => self.users.list_newest_first().await?,
        };
        Ok(users)
    }

    /// Total and active account counts.
    pub async fn counts(&self, actor: &Actor) -> DomainResult<(u64, u64)> {
        actor.require_super_admin()?;
        Ok((self.users.count().await?, self.users.count_active().await?))
    }

    pub async fn count_active(&self) -> DomainResult<u64> {
        Ok(self.users.count_active().await?)
    }

    pub async fn create(&self, actor: &Actor, input: NewUser) -> DomainResult<User> {
        actor.require_super_admin()?;
        input.validate()?;

        let username = input.username.trim().to_string();
        if self.users.exists_by_username(&username).await? {
            return Err(DomainError::Duplicate(format!(
                "Username '{username}' is already taken"
            )));
        }

        let user = User::new(
            username,
            self.passwords.hash(&input.password)?,
            input.full_name,
            input.email,
            input.role,
        );
        let user = self.users.insert(user).await?;
        info!(user_id = %user.id, created_by = %actor.user_id, "User created");
        Ok(user)
    }

    /// Profile update. Role and active flag are reserved for super admins.
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: UserPatch) -> DomainResult<User> {
        actor.require_self_or_super_admin(id)?;
        if patch.touches_privileged_fields() {
            actor.require_super_admin()?;
        }
        if actor.is_self(id) && patch.is_active == Patch::Value(false) {
            return Err(DomainError::validation("You cannot deactivate your own account"));
        }

        let mut user = self.find(id).await?;
        patch.apply_to(&mut user)?;
        let user = self.users.update(user).await?;
        info!(user_id = %id, updated_by = %actor.user_id, "User updated");
        Ok(user)
    }

    /// Change a password. Users changing their own must supply the old one;
    /// a super admin resetting another account does not.
    pub async fn change_password(
        &self,
        actor: &Actor,
        id: Uuid,
        old_password: Option<&str>,
        new_password: &str,
    ) -> DomainResult<()> {
        actor.require_self_or_super_admin(id)?;
        validate_password(new_password)?;

        let mut user = self.find(id).await?;
        if actor.is_self(id) {
            let old_password = old_password
                .ok_or_else(|| DomainError::validation("oldPassword is required"))?;
            if !self.passwords.verify(old_password, &user.password_hash)? {
                return Err(DomainError::validation("Old password is incorrect"));
            }
        }

        user.password_hash = self.passwords.hash(new_password)?;
        user.updated_at = Utc::now();
        self.users.update(user).await?;
        info!(user_id = %id, changed_by = %actor.user_id, "Password changed");
        Ok(())
    }

    pub async fn set_active(&self, actor: &Actor, id: Uuid, active: bool) -> DomainResult<User> {
        actor.require_super_admin()?;
        if !active && actor.is_self(id) {
            return Err(DomainError::validation("You cannot deactivate your own account"));
        }

        let mut user = self.find(id).await?;
        user.is_active = active;
        user.updated_at = Utc::now();
        let user = self.users.update(user).await?;
        info!(user_id = %id, active, "User active flag changed");
        Ok(user)
    }

    pub async fn toggle_active(&self, actor: &Actor, id: Uuid) -> DomainResult<User> {
        actor.require_super_admin()?;
        let user = self.find(id).await?;
        self.set_active(actor, id, !user.is_active).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> DomainResult<()> {
        actor.require_super_admin()?;
        if actor.is_self(id) {
            return Err(DomainError::validation("You cannot delete your own account"));
        }
        if !self.users.delete(id).await? {
            return Err(DomainError::not_found("User", id));
        }
        info!(user_id = %id, deleted_by = %actor.user_id, "User deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }
}
