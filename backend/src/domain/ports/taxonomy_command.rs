//! Driving port for creating tags and ingredients.

use async_trait::async_trait;

use crate::domain::{Error, Ingredient, Tag, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyCommand: Send + Sync {
    /// Validate `name` and create a tag owned by `owner`.
    async fn create_tag(&self, owner: &UserId, name: &str) -> Result<Tag, Error>;

    /// Validate `name` and create an ingredient owned by `owner`.
    async fn create_ingredient(&self, owner: &UserId, name: &str) -> Result<Ingredient, Error>;
}
