//! Driving port for listing tags and ingredients.

use async_trait::async_trait;

use crate::domain::{Error, Ingredient, Tag, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyQuery: Send + Sync {
    /// The owner's tags, optionally only those attached to a recipe.
    async fn list_tags(&self, owner: &UserId, assigned_only: bool) -> Result<Vec<Tag>, Error>;

    /// The owner's ingredients, optionally only those attached to a recipe.
    async fn list_ingredients(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, Error>;
}
