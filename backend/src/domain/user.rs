//! User account model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::password::HashedPassword;

/// Maximum length of an email address or a user name, in characters.
pub const USER_FIELD_MAX: usize = 255;

/// Validation errors raised by the user value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The user id was missing.
    #[error("user id must not be empty")]
    EmptyId,
    /// The user id was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The email was missing or blank.
    #[error("users must have an email address")]
    EmptyEmail,
    /// The email lacked a local part, an `@`, or a domain.
    #[error("email address is not valid")]
    InvalidEmail,
    /// The email exceeded [`USER_FIELD_MAX`].
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// The name exceeded [`USER_FIELD_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalised email address.
///
/// ## Invariants
/// - Surrounding whitespace is trimmed.
/// - The whole address is lowercased, local part included, so lookups are
///   case-insensitive.
/// - Exactly one `@` separates a non-empty local part from a non-empty domain.
///
/// # Examples
/// ```
/// use recipe_api::domain::Email;
///
/// let email = Email::new("Test@EXAMPLE.com").unwrap();
/// assert_eq!(email.as_ref(), "test@example.com");
/// assert!(Email::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::EmailTooLong {
                max: USER_FIELD_MAX,
            });
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Validate an optional email, treating absence as an empty address.
    pub fn from_optional(raw: Option<&str>) -> Result<Self, UserValidationError> {
        Self::new(raw.unwrap_or_default())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form user name. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate a user name, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_FIELD_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Account flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFlags {
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// Staff accounts may access administrative tooling.
    pub is_staff: bool,
    /// Superusers hold every permission.
    pub is_superuser: bool,
}

impl UserFlags {
    /// Flags for a regular, active account.
    pub const REGULAR: Self = Self {
        is_active: true,
        is_staff: false,
        is_superuser: false,
    };

    /// Flags for an active superuser.
    pub const SUPERUSER: Self = Self {
        is_active: true,
        is_staff: true,
        is_superuser: true,
    };
}

impl Default for UserFlags {
    fn default() -> Self {
        Self::REGULAR
    }
}

/// Application user.
///
/// Deliberately not `Serialize`: the password hash must never leave the
/// domain through a generic serialiser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    name: UserName,
    password: HashedPassword,
    flags: UserFlags,
}

impl User {
    /// Build a regular active user with an empty name.
    #[must_use]
    pub fn new(id: UserId, email: Email, password: HashedPassword) -> Self {
        Self {
            id,
            email,
            name: UserName::default(),
            password,
            flags: UserFlags::REGULAR,
        }
    }

    /// Replace the name.
    #[must_use]
    pub fn with_name(mut self, name: UserName) -> Self {
        self.name = name;
        self
    }

    /// Replace the account flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: UserFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Normalised email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// User name, possibly empty.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Stored password hash.
    #[must_use]
    pub const fn password_hash(&self) -> &HashedPassword {
        &self.password
    }

    /// Account flags.
    #[must_use]
    pub const fn flags(&self) -> UserFlags {
        self.flags
    }

    /// Whether the account may log in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.flags.is_active
    }

    /// Whether the account is staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.flags.is_staff
    }

    /// Whether the account is a superuser.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.flags.is_superuser
    }

    /// Verify a candidate password against the stored hash.
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }

    /// Replace the name in place.
    pub fn set_name(&mut self, name: UserName) {
        self.name = name;
    }

    /// Replace the password hash in place.
    pub fn set_password_hash(&mut self, password: HashedPassword) {
        self.password = password;
    }
}
