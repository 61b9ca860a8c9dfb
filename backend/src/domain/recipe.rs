//! Recipe aggregate and its value objects.
//!
//! A recipe belongs to exactly one user and links to that user's tags and
//! ingredients. Creation goes through [`RecipeDraft`]; changes go through
//! [`RecipePatch`], whose `Option` fields distinguish "leave alone" from
//! "replace".

use std::collections::BTreeSet;
use std::fmt;


use super::{ImagePath, Ingredient, IngredientId, RecipeId, Tag, TagId, UserId};

/// Maximum recipe title length, in characters.
pub const RECIPE_TITLE_MAX: usize = 255;
/// Largest representable price in cents (999.99).
pub const PRICE_MAX_CENTS: i64 = 99_999;

const PRICE_MAX_INTEGER_DIGITS: usize = 3;
const PRICE_MAX_DECIMAL_PLACES: usize = 2;

/// Validation errors for recipe fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    /// The title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// The title exceeded [`RECIPE_TITLE_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// Preparation time was zero, negative or out of range.
    #[error("time_minutes must be a positive integer, got {value}")]
    InvalidTimeMinutes {
        /// Offending value.
        value: i64,
    },
    /// The price was not a non-negative decimal with at most two places.
    #[error("price must be a decimal with at most two decimal places, got '{value}'")]
    InvalidPrice {
        /// Offending input.
        value: String,
    },
    /// The price exceeded 999.99.
    #[error("price must not exceed 999.99, got '{value}'")]
    PriceOutOfRange {
        /// Offending input.
        value: String,
    },
}

/// Validated recipe title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTitle(String);

impl RecipeTitle {
    /// Validate a raw title, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > RECIPE_TITLE_MAX {
            return Err(RecipeValidationError::TitleTooLong {
                max: RECIPE_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecipeTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Preparation time in whole minutes, at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeMinutes(i32);

impl TimeMinutes {
    /// Validate a raw minute count.
    pub fn new(raw: i64) -> Result<Self, RecipeValidationError> {
        i32::try_from(raw)
            .ok()
            .filter(|minutes| *minutes >= 1)
            .map(Self)
            .ok_or(RecipeValidationError::InvalidTimeMinutes { value: raw })
    }

    /// Minute count.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Non-negative price with two decimal places, held as integer cents.
///
/// Parsing works on the decimal text and never goes through floating point.
///
/// # Examples
/// ```
/// use recipe_api::domain::Price;
///
/// let price: Price = "5.5".parse().unwrap();
/// assert_eq!(price.cents(), 550);
/// assert_eq!(price.to_string(), "5.50");
/// assert!("1000".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i64);

impl Price {
    /// Construct from a cent amount.
    pub fn from_cents(cents: i64) -> Result<Self, RecipeValidationError> {
        if !(0..=PRICE_MAX_CENTS).contains(&cents) {
            return Err(RecipeValidationError::PriceOutOfRange {
                value: cents.to_string(),
            });
        }
        Ok(Self(cents))
    }

    /// Amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    fn parse_decimal(raw: &str) -> Result<Self, RecipeValidationError> {
        let invalid = || RecipeValidationError::InvalidPrice {
            value: raw.to_owned(),
        };
        let text = raw.trim();
        let (integer, fraction) = text.split_once('.').unwrap_or((text, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > PRICE_MAX_DECIMAL_PLACES {
            return Err(invalid());
        }
        let significant = integer.trim_start_matches('0');
        if significant.len() > PRICE_MAX_INTEGER_DIGITS {
            return Err(RecipeValidationError::PriceOutOfRange {
                value: raw.to_owned(),
            });
        }

        let whole: i64 = if significant.is_empty() {
            0
        } else {
            significant.parse().map_err(|_| invalid())?
        };
        let padded = format!("{fraction:0<2}");
        let cents: i64 = padded.parse().map_err(|_| invalid())?;
        Self::from_cents(whole * 100 + cents)
    }
}

impl std::str::FromStr for Price {
    type Err = RecipeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A stored recipe with its resolved tags and ingredients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Database identifier; increases monotonically.
    pub id: RecipeId,
    /// Owning user.
    pub owner: UserId,
    /// Title.
    pub title: RecipeTitle,
    /// Preparation time.
    pub time_minutes: TimeMinutes,
    /// Price.
    pub price: Price,
    /// Linked tags, all owned by `owner`.
    pub tags: Vec<Tag>,
    /// Linked ingredients, all owned by `owner`.
    pub ingredients: Vec<Ingredient>,
    /// Uploaded image, if any.
    pub image: Option<ImagePath>,
}

impl Recipe {
    /// Ids of the linked tags.
    #[must_use]
    pub fn tag_ids(&self) -> BTreeSet<TagId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }

    /// Ids of the linked ingredients.
    #[must_use]
    pub fn ingredient_ids(&self) -> BTreeSet<IngredientId> {
        self.ingredients.iter().map(|ingredient| ingredient.id).collect()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.title, f)
    }
}

/// Complete set of caller-supplied fields for a new recipe.
///
/// Omitted relations default to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Title.
    pub title: RecipeTitle,
    /// Preparation time.
    pub time_minutes: TimeMinutes,
    /// Price.
    pub price: Price,
    /// Requested tag ids.
    pub tags: Vec<TagId>,
    /// Requested ingredient ids.
    pub ingredients: Vec<IngredientId>,
}

impl RecipeDraft {
    /// Draft with no tags or ingredients.
    #[must_use]
    pub const fn new(title: RecipeTitle, time_minutes: TimeMinutes, price: Price) -> Self {
        Self {
            title,
            time_minutes,
            price,
            tags: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    /// Attach tag ids.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Attach ingredient ids.
    #[must_use]
    pub fn with_ingredients(mut self, ingredients: impl IntoIterator<Item = IngredientId>) -> Self {
        self.ingredients = ingredients.into_iter().collect();
        self
    }
}

/// Explicit change set for an existing recipe.
///
/// `None` leaves a field untouched. `Some` on `tags` or `ingredients`
/// replaces the whole set, so `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    /// New title.
    pub title: Option<RecipeTitle>,
    /// New preparation time.
    pub time_minutes: Option<TimeMinutes>,
    /// New price.
    pub price: Option<Price>,
    /// Replacement tag ids.
    pub tags: Option<Vec<TagId>>,
    /// Replacement ingredient ids.
    pub ingredients: Option<Vec<IngredientId>>,
}

impl RecipePatch {
    /// Copy the scalar fields that are present onto `recipe`.
    pub fn apply_scalars(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
    }
}

/// Full update: every field present, relations replaced even when empty.
impl From<RecipeDraft> for RecipePatch {
    fn from(draft: RecipeDraft) -> Self {
        Self {
            title: Some(draft.title),
            time_minutes: Some(draft.time_minutes),
            price: Some(draft.price),
            tags: Some(draft.tags),
            ingredients: Some(draft.ingredients),
        }
    }
}

/// Repository input for inserting a recipe whose relations are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    /// Owning user.
    pub owner: UserId,
    /// Title.
    pub title: RecipeTitle,
    /// Preparation time.
    pub time_minutes: TimeMinutes,
    /// Price.
    pub price: Price,
    /// Tags to link.
    pub tags: Vec<Tag>,
    /// Ingredients to link.
    pub ingredients: Vec<Ingredient>,
}
