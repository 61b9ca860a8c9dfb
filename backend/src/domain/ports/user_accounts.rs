//! Driving port for account registration and profile management.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Error, User, UserId};

/// Raw registration input as received from a client or the CLI.
///
/// Validation happens inside the use-case so every caller gets the same
/// rules.
#[derive(Debug, Clone)]
pub struct AccountRequest {
    /// Email as typed; normalised by the service.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Zeroizing<String>,
    /// Optional display name.
    pub name: Option<String>,
}

impl AccountRequest {
    /// Request with an email and password and no name.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Zeroizing::new(password.into()),
            name: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Partial update of the authenticated user's profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement password, re-hashed before storage.
    pub password: Option<Zeroizing<String>>,
}

/// Domain use-case port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Register a regular user.
    async fn create_user(&self, request: AccountRequest) -> Result<User, Error>;

    /// Register a staff superuser.
    async fn create_superuser(&self, request: AccountRequest) -> Result<User, Error>;

    /// Load the user behind a session.
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error>;

    /// Apply a partial profile update and return the stored user.
    async fn update_current_user(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error>;
}
