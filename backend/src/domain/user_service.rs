//! Account registration, login and profile services.
//!
//! Implements the [`UserAccounts`] and [`LoginService`] driving ports over a
//! [`UserRepository`]. Argon2 work runs on the blocking pool so request
//! workers stay responsive.

use std::sync::Arc;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountRequest, LoginService, ProfileUpdate, UserAccounts, UserPersistenceError,
    UserRepository,
};
use crate::domain::password::decoy_hash;
use crate::domain::{
    Email, Error, HashedPassword, LoginCredentials, Password, PasswordError, User, UserFlags,
    UserId, UserName, UserValidationError,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// User account service implementing the account and login ports.
#[derive(Clone)]
pub struct UserAccountService<R> {
    users: Arc<R>,
}

impl<R> UserAccountService<R> {
    /// Create a new service over the given repository.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

impl<R> UserAccountService<R>
where
    R: UserRepository,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => Error::invalid_field(
                "email",
                "email_taken",
                "a user with this email already exists",
            ),
        }
    }

    fn map_user_validation(error: UserValidationError) -> Error {
        let (field, code) = match error {
            UserValidationError::EmptyEmail => ("email", "required"),
            UserValidationError::InvalidEmail => ("email", "invalid_email"),
            UserValidationError::EmailTooLong { .. } => ("email", "too_long"),
            UserValidationError::NameTooLong { .. } => ("name", "too_long"),
            UserValidationError::EmptyId | UserValidationError::InvalidId => ("id", "invalid_id"),
        };
        Error::invalid_field(field, code, error.to_string())
    }

    fn map_password_error(error: PasswordError) -> Error {
        match error {
            PasswordError::TooShort { .. } => {
                Error::invalid_field("password", "too_short", error.to_string())
            }
            PasswordError::Hashing { message } => {
                Error::internal(format!("password hashing failed: {message}"))
            }
        }
    }

    async fn hash_password(password: Password) -> Result<HashedPassword, Error> {
        tokio::task::spawn_blocking(move || password.hash())
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(Self::map_password_error)
    }

    async fn register(&self, request: AccountRequest, flags: UserFlags) -> Result<User, Error> {
        let AccountRequest {
            email,
            mut password,
            name,
        } = request;
        let email = Email::from_optional(email.as_deref()).map_err(Self::map_user_validation)?;
        let name = name
            .as_deref()
            .map(UserName::new)
            .transpose()
            .map_err(Self::map_user_validation)?
            .unwrap_or_default();
        let password =
            Password::new(std::mem::take(&mut *password)).map_err(Self::map_password_error)?;
        let hashed = Self::hash_password(password).await?;

        let user = User::new(UserId::random(), email, hashed)
            .with_name(name)
            .with_flags(flags);
        self.users
            .insert(&user)
            .await
            .map_err(Self::map_user_error)?;
        tracing::info!(
            user_id = %user.id(),
            is_superuser = user.is_superuser(),
            "user registered"
        );
        Ok(user)
    }

    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<R> UserAccounts for UserAccountService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, request: AccountRequest) -> Result<User, Error> {
        self.register(request, UserFlags::REGULAR).await
    }

    async fn create_superuser(&self, request: AccountRequest) -> Result<User, Error> {
        self.register(request, UserFlags::SUPERUSER).await
    }

    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn update_current_user(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let ProfileUpdate { name, password } = update;
        let name = name
            .as_deref()
            .map(UserName::new)
            .transpose()
            .map_err(Self::map_user_validation)?;
        let password = password
            .map(|mut plain| Password::new(std::mem::take(&mut *plain)))
            .transpose()
            .map_err(Self::map_password_error)?;

        let mut user = self.load(user_id).await?;
        if let Some(name) = name {
            user.set_name(name);
        }
        if let Some(password) = password {
            user.set_password_hash(Self::hash_password(password).await?);
        }

        let updated = self
            .users
            .update(&user)
            .await
            .map_err(Self::map_user_error)?;
        if !updated {
            return Err(Error::not_found("user not found"));
        }
        Ok(user)
    }
}

#[async_trait]
impl<R> LoginService for UserAccountService<R>
where
    R: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let found = self
            .users
            .find_by_email(&email)
            .await
            .map_err(Self::map_user_error)?;

        let candidate = Zeroizing::new(credentials.password().to_owned());
        let verified = tokio::task::spawn_blocking(move || verify_login(found, &candidate))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?;
        match verified {
            Some(user) if user.is_active() => Ok(*user.id()),
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }
}

/// Check `candidate` against the account, or against the decoy hash when
/// there is none, so every lookup pays one Argon2 verification.
fn verify_login(found: Option<User>, candidate: &str) -> Option<User> {
    match found {
        Some(user) => user.check_password(candidate).then_some(user),
        None => {
            let _matched = decoy_hash().verify(candidate);
            None
        }
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
