//! Password policy and one-way hashing.
//!
//! Plain passwords only ever live inside [`Password`], which zeroes its buffer
//! on drop. Stored credentials are Argon2id PHC strings wrapped in
//! [`HashedPassword`]; the plain form is never persisted.

use std::fmt;
use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Minimum number of characters accepted for a new password.
pub const PASSWORD_MIN_LENGTH: usize = 5;

pub(crate) static DECOY_HASH: OnceLock<HashedPassword> = OnceLock::new();

/// Hash of a random secret, checked when a login names no known account so
/// the miss does the same Argon2 work as a wrong password.
///
/// Built on first use; call from a blocking context.
pub(crate) fn decoy_hash() -> &'static HashedPassword {
    DECOY_HASH.get_or_init(|| {
        Password::new(Uuid::new_v4().to_string())
            .and_then(|secret| secret.hash())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "decoy password hash unavailable");
                HashedPassword::from_phc(String::new())
            })
    })
}

/// Errors raised while validating or hashing passwords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The candidate password is shorter than the policy allows.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Required minimum length.
        min: usize,
    },
    /// The hasher rejected the input or parameters.
    #[error("password hashing failed: {message}")]
    Hashing {
        /// Hasher diagnostic.
        message: String,
    },
}

/// A plain password that satisfies the password policy.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a candidate password against [`PASSWORD_MIN_LENGTH`].
    ///
    /// # Examples
    /// ```
    /// use recipe_api::domain::Password;
    ///
    /// assert!(Password::new("pw").is_err());
    /// assert!(Password::new("testpass123").is_ok());
    /// ```
    pub fn new(candidate: impl Into<String>) -> Result<Self, PasswordError> {
        let candidate = Zeroizing::new(candidate.into());
        if candidate.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }
        Ok(Self(candidate))
    }

    /// Expose the plain text for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Hash this password with a fresh random salt.
    ///
    /// Argon2 is deliberately slow; call from a blocking context.
    pub fn hash(&self) -> Result<HashedPassword, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(self.expose().as_bytes(), &salt)
            .map(|hash| HashedPassword(hash.to_string()))
            .map_err(|err| PasswordError::Hashing {
                message: err.to_string(),
            })
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Argon2id hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a PHC string loaded from storage.
    #[must_use]
    pub const fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    /// PHC string suitable for storage.
    #[must_use]
    pub fn as_phc(&self) -> &str {
        self.0.as_str()
    }

    /// Check a candidate password against the stored hash.
    ///
    /// Malformed stored hashes never verify.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(err) => {
                tracing::warn!(error = %err, "stored password hash is not a valid PHC string");
                false
            }
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}
