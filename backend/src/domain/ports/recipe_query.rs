//! Driving port for recipe reads.

use async_trait::async_trait;

use crate::domain::{Error, Recipe, RecipeFilter, RecipeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// The owner's recipes passing `filter`, newest first.
    async fn list(&self, owner: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error>;

    /// One of the owner's recipes, or `not_found`.
    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error>;
}
