//! Password hashing for staff accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use portal_core::ports::{AuthError, PasswordService};

/// Stores passwords as Argon2id PHC strings (`$argon2id$v=19$...`), each
/// with its own random salt. Verification reads the parameters back from
/// the stored string, so older hashes keep working if the defaults change.
pub struct Argon2PasswordService {
    hasher: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

fn hashing_error(e: password_hash::Error) -> AuthError {
    AuthError::HashingError(e.to_string())
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(hashing_error)?;
        Ok(phc.to_string())
    }

    /// `Ok(false)` on a wrong password; an unreadable stored hash is an error.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(stored).map_err(hashing_error)?;
        match self.hasher.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(hashing_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("admin123", &hash).unwrap());
        assert!(!service.verify("admin124", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let service = Argon2PasswordService::new();
        assert_ne!(service.hash("admin123").unwrap(), service.hash("admin123").unwrap());
    }

    #[test]
    fn test_plaintext_stored_value_is_a_hashing_error() {
        let service = Argon2PasswordService::new();
        assert!(matches!(
            service.verify("admin123", "admin123"),
            Err(AuthError::HashingError(_))
        ));
    }
}
