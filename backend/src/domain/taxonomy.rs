//! Tags and ingredients: per-user labels attached to recipes.

use std::fmt;

use super::{IngredientId, TagId, UserId};

/// Maximum length of a tag or ingredient name, in characters.
pub const TAXONOMY_NAME_MAX: usize = 255;

/// Validation errors for tag and ingredient names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyValidationError {
    /// The name was blank.
    #[error("name must not be empty")]
    EmptyName,
    /// The name exceeded [`TAXONOMY_NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Validated, trimmed tag or ingredient name.
///
/// # Examples
/// ```
/// use recipe_api::domain::TaxonomyName;
///
/// assert_eq!(TaxonomyName::new("  Vegan ").unwrap().as_ref(), "Vegan");
/// assert!(TaxonomyName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyName(String);

impl TaxonomyName {
    /// Validate a raw name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaxonomyValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaxonomyValidationError::EmptyName);
        }
        if trimmed.chars().count() > TAXONOMY_NAME_MAX {
            return Err(TaxonomyValidationError::NameTooLong {
                max: TAXONOMY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TaxonomyName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<TaxonomyName> for String {
    fn from(value: TaxonomyName) -> Self {
        value.0
    }
}

/// A recipe tag owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Database identifier.
    pub id: TagId,
    /// Owning user.
    pub owner: UserId,
    /// Display name.
    pub name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A recipe ingredient owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    /// Database identifier.
    pub id: IngredientId,
    /// Owning user.
    pub owner: UserId,
    /// Display name.
    pub name: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Listing order shared by every taxonomy adapter: name descending, then id
/// descending so equal names stay deterministic.
pub(crate) fn taxonomy_order<I: Ord>(a: (&str, I), b: (&str, I)) -> std::cmp::Ordering {
    b.0.cmp(a.0).then_with(|| b.1.cmp(&a.1))
}
