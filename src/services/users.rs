use std::sync::Arc;

use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use crate::error::{PlacesError, Result};
use crate::models::{normalize_email, LoginRequest, SignupRequest, User};
use crate::services::validation::validate_signup;
use crate::store::{DocumentStore, StoreError};

pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    pub async fn signup(&self, mut request: SignupRequest) -> Result<User> {
        request.email = normalize_email(&request.email);
        validate_signup(&request)?;

        if self.store.find_user_by_email(&request.email).await?.is_some() {
            return Err(PlacesError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email,
            password: hash_password(&request.password)?,
            image: request.image,
            places: Vec::new(),
        };

        match self.store.save_user(&user).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(PlacesError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<User> {
        let email = normalize_email(&request.email);

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(PlacesError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(PlacesError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Returns `Ok(false)` on mismatch. A stored value that is not a PHC string is
/// treated as a mismatch.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password is not a valid hash");
            return Ok(false);
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("failed to verify password: {}", e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_plaintext_stored_value_never_matches() {
        assert!(!verify_password("213131", "213131").unwrap());
    }
}
