//! Driving port for recipe mutations.

use async_trait::async_trait;

use crate::domain::{Error, ImageUpload, Recipe, RecipeDraft, RecipeId, RecipePatch, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    /// Create a recipe linked to the owner's tags and ingredients.
    async fn create(&self, owner: &UserId, draft: RecipeDraft) -> Result<Recipe, Error>;

    /// Apply `patch` to one of the owner's recipes.
    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, Error>;

    /// Delete a recipe and its stored image.
    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error>;

    /// Validate and store an image, replacing any previous one.
    async fn upload_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        upload: ImageUpload,
    ) -> Result<Recipe, Error>;
}
