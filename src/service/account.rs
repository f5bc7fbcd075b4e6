//! Account service
//!
//! Handles the admin user: one-time creation and password checks.

use std::path::Path;
use std::sync::Arc;

use crate::data::{Database, EntityId, User};
use crate::error::AppError;

#[cfg(test)]
const PASSWORD_HASH_COST: u32 = 4;
#[cfg(not(test))]
const PASSWORD_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Shortest accepted admin password
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Open the database at `path` directly
    ///
    /// Does not require a configured media store.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let db = Database::connect(path).await?;
        Ok(Self::new(Arc::new(db)))
    }

    /// Whether an admin account exists yet
    pub async fn has_admin(&self) -> Result<bool, AppError> {
        Ok(self.db.count_users().await? > 0)
    }

    /// Create the admin account
    ///
    /// Only succeeds while no user exists.
    ///
    /// # Errors
    /// `InvalidInput` for a blank username, a short password, or when an
    /// account already exists
    pub async fn create_admin(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput(
                "username cannot be empty".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        // Fast-path guard before hashing.
        if self.has_admin().await? {
            return Err(AppError::InvalidInput(
                "an admin account already exists".to_string(),
            ));
        }

        let password = password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_HASH_COST))
                .await
                .map_err(|e| AppError::Internal(e.into()))?
                .map_err(|e| AppError::Internal(e.into()))?;

        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            password_hash,
            created_at: chrono::Utc::now(),
        };

        if !self.db.insert_user_if_none(&user).await? {
            return Err(AppError::InvalidInput(
                "an admin account already exists".to_string(),
            ));
        }

        tracing::info!(username = %user.username, "Admin account created");
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// # Errors
    /// `Unauthorized` when the user is unknown or the password is wrong
    pub async fn verify_login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .db
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .unwrap_or(false);

        if valid { Ok(user) } else { Err(AppError::Unauthorized) }
    }
}
