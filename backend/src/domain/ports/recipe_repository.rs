//! Port for recipe persistence.
//!
//! Adapters store a recipe row plus its tag and ingredient links and return
//! recipes with those relations resolved. Multi-row writes are atomic.
//!
//! The image column has its own writer: detail updates never touch it, so an
//! edit racing an upload cannot roll the recorded image back.

use async_trait::async_trait;

use crate::domain::{ImagePath, NewRecipe, Recipe, RecipeFilter, RecipeId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// The recipe vanished between read and write.
        NotFound { id: i64 } => "recipe {id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe and its links, returning it with a fresh id.
    async fn insert(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError>;

    /// Fetch one of the owner's recipes.
    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// The owner's recipes passing `filter`, newest first.
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError>;

    /// Overwrite the scalars and both link sets of an existing recipe.
    ///
    /// The stored image is left as it is. Returns the recipe as stored after
    /// the write, image included.
    async fn update_details(&self, recipe: &Recipe) -> Result<Recipe, RecipeRepositoryError>;

    /// Record `image` on one of the owner's recipes and return the path it
    /// replaced. Concurrent swaps are serialised.
    async fn set_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &ImagePath,
    ) -> Result<Option<ImagePath>, RecipeRepositoryError>;

    /// Delete one of the owner's recipes. Returns `None` when absent.
    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<DeletedRecipe>, RecipeRepositoryError>;
}

/// What remained of a recipe at the moment it was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedRecipe {
    /// Image recorded on the row when it was removed.
    pub image: Option<ImagePath>,
}
