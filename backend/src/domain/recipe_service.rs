//! Recipe use-cases.
//!
//! This module implements the recipe driving ports. Every operation is
//! scoped to the requesting user: recipes, tags and ingredients owned by
//! anyone else behave as if they did not exist.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{
    ImageNameGenerator, ImageStoreError, RecipeCommand, RecipeImageStore, RecipeQuery,
    RecipeRepository, RecipeRepositoryError, TaxonomyRepository,
};
use crate::domain::recipe_image::image_extension;
use crate::domain::taxonomy_service::map_taxonomy_error;
use crate::domain::{
    Error, ImagePath, ImageUpload, ImageValidationError, Ingredient, IngredientId, NewRecipe,
    Recipe, RecipeDraft, RecipeFilter, RecipeId, RecipePatch, Tag, TagId, UserId,
    ValidatedImage, recipe_image_file_path, validate_image,
};

/// Collaborators required by [`RecipeService`].
pub struct RecipeServicePorts<R, T, S> {
    /// Recipe persistence.
    pub recipes: Arc<R>,
    /// Tag and ingredient lookups for association checks.
    pub taxonomy: Arc<T>,
    /// Image blob storage.
    pub images: Arc<S>,
    /// Random stems for stored image names.
    pub names: Arc<dyn ImageNameGenerator>,
}

/// Recipe service implementing the recipe driving ports.
pub struct RecipeService<R, T, S> {
    recipes: Arc<R>,
    taxonomy: Arc<T>,
    images: Arc<S>,
    names: Arc<dyn ImageNameGenerator>,
}

impl<R, T, S> Clone for RecipeService<R, T, S> {
    fn clone(&self) -> Self {
        Self {
            recipes: Arc::clone(&self.recipes),
            taxonomy: Arc::clone(&self.taxonomy),
            images: Arc::clone(&self.images),
            names: Arc::clone(&self.names),
        }
    }
}

impl<R, T, S> RecipeService<R, T, S> {
    /// Create a new service from its collaborators.
    pub fn new(ports: RecipeServicePorts<R, T, S>) -> Self {
        let RecipeServicePorts {
            recipes,
            taxonomy,
            images,
            names,
        } = ports;
        Self {
            recipes,
            taxonomy,
            images,
            names,
        }
    }
}

fn map_recipe_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::NotFound { .. } => recipe_not_found(),
    }
}

fn map_image_store_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("image store unavailable: {message}"))
        }
        ImageStoreError::Io { path, message } => {
            Error::internal(format!("image store failed for {path}: {message}"))
        }
    }
}

fn map_image_validation(error: ImageValidationError) -> Error {
    let code = match error {
        ImageValidationError::Empty => "required",
        ImageValidationError::UnsupportedFormat { .. } => "unsupported_format",
        ImageValidationError::Unrecognised | ImageValidationError::Corrupt { .. } => {
            "invalid_image"
        }
        ImageValidationError::TooLarge { .. } => "too_large",
    };
    Error::invalid_field("image", code, error.to_string())
}

async fn decode_upload(bytes: Vec<u8>) -> Result<ValidatedImage, Error> {
    tokio::task::spawn_blocking(move || validate_image(bytes))
        .await
        .map_err(|err| Error::internal(format!("image validation task failed: {err}")))?
        .map_err(map_image_validation)
}

fn recipe_not_found() -> Error {
    Error::not_found("recipe not found")
}

fn unknown_ids(field: &str, code: &str, missing: Vec<i64>) -> Error {
    Error::invalid_request(format!("unknown {field} for this user")).with_details(json!({
        "field": field,
        "code": code,
        "ids": missing,
    }))
}

impl<R, T, S> RecipeService<R, T, S>
where
    R: RecipeRepository,
    T: TaxonomyRepository,
    S: RecipeImageStore,
{
    async fn resolve_tags(&self, owner: &UserId, ids: &[TagId]) -> Result<Vec<Tag>, Error> {
        let wanted: BTreeSet<TagId> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = self
            .taxonomy
            .find_owned_tags(owner, &wanted)
            .await
            .map_err(map_taxonomy_error)?;
        let known: BTreeSet<TagId> = found.iter().map(|tag| tag.id).collect();
        let missing: Vec<i64> = wanted.difference(&known).map(|id| id.get()).collect();
        if !missing.is_empty() {
            return Err(unknown_ids("tags", "unknown_tag", missing));
        }
        found.sort_by_key(|tag| tag.id);
        Ok(found)
    }

    async fn resolve_ingredients(
        &self,
        owner: &UserId,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, Error> {
        let wanted: BTreeSet<IngredientId> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = self
            .taxonomy
            .find_owned_ingredients(owner, &wanted)
            .await
            .map_err(map_taxonomy_error)?;
        let known: BTreeSet<IngredientId> = found.iter().map(|ingredient| ingredient.id).collect();
        let missing: Vec<i64> = wanted.difference(&known).map(|id| id.get()).collect();
        if !missing.is_empty() {
            return Err(unknown_ids("ingredients", "unknown_ingredient", missing));
        }
        found.sort_by_key(|ingredient| ingredient.id);
        Ok(found)
    }

    async fn load(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(owner, id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(recipe_not_found)
    }

    async fn discard_image(&self, path: &ImagePath) {
        if let Err(err) = self.images.remove(path).await {
            tracing::warn!(error = %err, image = %path, "failed to remove recipe image");
        }
    }
}

#[async_trait]
impl<R, T, S> RecipeCommand for RecipeService<R, T, S>
where
    R: RecipeRepository,
    T: TaxonomyRepository,
    S: RecipeImageStore,
{
    async fn create(&self, owner: &UserId, draft: RecipeDraft) -> Result<Recipe, Error> {
        let tags = self.resolve_tags(owner, &draft.tags).await?;
        let ingredients = self.resolve_ingredients(owner, &draft.ingredients).await?;
        let recipe = self
            .recipes
            .insert(&NewRecipe {
                owner: *owner,
                title: draft.title,
                time_minutes: draft.time_minutes,
                price: draft.price,
                tags,
                ingredients,
            })
            .await
            .map_err(map_recipe_error)?;
        tracing::info!(recipe_id = %recipe.id, user_id = %owner, "recipe created");
        Ok(recipe)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, Error> {
        let mut recipe = self.load(owner, id).await?;
        if let Some(ids) = &patch.tags {
            recipe.tags = self.resolve_tags(owner, ids).await?;
        }
        if let Some(ids) = &patch.ingredients {
            recipe.ingredients = self.resolve_ingredients(owner, ids).await?;
        }
        patch.apply_scalars(&mut recipe);

        let stored = self
            .recipes
            .update_details(&recipe)
            .await
            .map_err(map_recipe_error)?;
        tracing::info!(recipe_id = %stored.id, user_id = %owner, "recipe updated");
        Ok(stored)
    }

    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error> {
        let deleted = self
            .recipes
            .delete(owner, id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(recipe_not_found)?;
        if let Some(image) = &deleted.image {
            self.discard_image(image).await;
        }
        tracing::info!(recipe_id = %id, user_id = %owner, "recipe deleted");
        Ok(())
    }

    async fn upload_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        upload: ImageUpload,
    ) -> Result<Recipe, Error> {
        let mut recipe = self.load(owner, id).await?;
        let ImageUpload { bytes, filename } = upload;
        let image = decode_upload(bytes).await?;

        let original = match filename.as_deref() {
            Some(name) if image_extension(name).is_some() => name.to_owned(),
            _ => format!("upload.{}", image.extension()),
        };
        let path = recipe_image_file_path(&original, self.names.as_ref());
        self.images
            .store(&path, image.into_bytes())
            .await
            .map_err(map_image_store_error)?;

        let previous = match self.recipes.set_image(owner, id, &path).await {
            Ok(previous) => previous,
            Err(err) => {
                self.discard_image(&path).await;
                return Err(map_recipe_error(err));
            }
        };
        if let Some(previous) = previous.filter(|old| *old != path) {
            self.discard_image(&previous).await;
        }
        recipe.image = Some(path.clone());
        tracing::info!(recipe_id = %recipe.id, image = %path, "recipe image stored");
        Ok(recipe)
    }
}

#[async_trait]
impl<R, T, S> RecipeQuery for RecipeService<R, T, S>
where
    R: RecipeRepository,
    T: TaxonomyRepository,
    S: RecipeImageStore,
{
    async fn list(&self, owner: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error> {
        self.recipes
            .list(owner, &filter)
            .await
            .map_err(map_recipe_error)
    }

    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error> {
        self.load(owner, id).await
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
