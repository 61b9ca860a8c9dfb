//! In-process adapter implementing every repository port.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. All state sits behind one mutex so multi-row writes are atomic in
//! the same way a database transaction would make them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    DeletedRecipe, RecipeRepository, RecipeRepositoryError, TaxonomyRepository,
    TaxonomyRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::taxonomy::taxonomy_order;
use crate::domain::{
    Email, ImagePath, Ingredient, IngredientId, NewRecipe, Recipe, RecipeFilter, RecipeId, Tag,
    TagId, TaxonomyName, User, UserId,
};

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    tags: BTreeMap<TagId, Tag>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, Recipe>,
    last_tag_id: i64,
    last_ingredient_id: i64,
    last_recipe_id: i64,
}

impl State {
    fn linked_tag_ids(&self) -> BTreeSet<TagId> {
        self.recipes.values().flat_map(Recipe::tag_ids).collect()
    }

    fn linked_ingredient_ids(&self) -> BTreeSet<IngredientId> {
        self.recipes.values().flat_map(Recipe::ingredient_ids).collect()
    }

    fn owned_recipe_mut(&mut self, owner: &UserId, id: RecipeId) -> Option<&mut Recipe> {
        self.recipes
            .get_mut(&id)
            .filter(|stored| stored.owner == *owner)
    }
}

/// Shared in-memory store; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryPersistence {
    state: Arc<Mutex<State>>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryPersistence {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| poisoned(POISONED))
    }
}

#[async_trait]
impl UserRepository for InMemoryPersistence {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        if state.users.values().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        match state.users.get_mut(user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryPersistence {
    async fn insert_tag(
        &self,
        owner: &UserId,
        name: &TaxonomyName,
    ) -> Result<Tag, TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        state.last_tag_id += 1;
        let tag = Tag {
            id: TagId::new(state.last_tag_id),
            owner: *owner,
            name: name.as_ref().to_owned(),
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn list_tags(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError> {
        let state = self.lock(TaxonomyRepositoryError::query)?;
        let linked = assigned_only.then(|| state.linked_tag_ids());
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|tag| tag.owner == *owner)
            .filter(|tag| linked.as_ref().is_none_or(|ids| ids.contains(&tag.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| taxonomy_order((a.name.as_str(), a.id), (b.name.as_str(), b.id)));
        Ok(tags)
    }

    async fn find_owned_tags(
        &self,
        owner: &UserId,
        ids: &BTreeSet<TagId>,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError> {
        let state = self.lock(TaxonomyRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.tags.get(id))
            .filter(|tag| tag.owner == *owner)
            .cloned()
            .collect())
    }

    async fn insert_ingredient(
        &self,
        owner: &UserId,
        name: &TaxonomyName,
    ) -> Result<Ingredient, TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        state.last_ingredient_id += 1;
        let ingredient = Ingredient {
            id: IngredientId::new(state.last_ingredient_id),
            owner: *owner,
            name: name.as_ref().to_owned(),
        };
        state.ingredients.insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }

    async fn list_ingredients(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, TaxonomyRepositoryError> {
        let state = self.lock(TaxonomyRepositoryError::query)?;
        let linked = assigned_only.then(|| state.linked_ingredient_ids());
        let mut ingredients: Vec<Ingredient> = state
            .ingredients
            .values()
            .filter(|ingredient| ingredient.owner == *owner)
            .filter(|ingredient| {
                linked
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&ingredient.id))
            })
            .cloned()
            .collect();
        ingredients.sort_by(|a, b| taxonomy_order((a.name.as_str(), a.id), (b.name.as_str(), b.id)));
        Ok(ingredients)
    }

    async fn find_owned_ingredients(
        &self,
        owner: &UserId,
        ids: &BTreeSet<IngredientId>,
    ) -> Result<Vec<Ingredient>, TaxonomyRepositoryError> {
        let state = self.lock(TaxonomyRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.ingredients.get(id))
            .filter(|ingredient| ingredient.owner == *owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RecipeRepository for InMemoryPersistence {
    async fn insert(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        state.last_recipe_id += 1;
        let stored = Recipe {
            id: RecipeId::new(state.last_recipe_id),
            owner: recipe.owner,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            tags: recipe.tags.clone(),
            ingredients: recipe.ingredients.clone(),
            image: None,
        };
        state.recipes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let state = self.lock(RecipeRepositoryError::query)?;
        Ok(state
            .recipes
            .get(&id)
            .filter(|recipe| recipe.owner == *owner)
            .cloned())
    }

    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let state = self.lock(RecipeRepositoryError::query)?;
        let newest_first: Vec<Recipe> = state
            .recipes
            .values()
            .rev()
            .filter(|recipe| recipe.owner == *owner)
            .cloned()
            .collect();
        Ok(filter.apply(newest_first))
    }

    async fn update_details(&self, recipe: &Recipe) -> Result<Recipe, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        let stored = state
            .owned_recipe_mut(&recipe.owner, recipe.id)
            .ok_or_else(|| RecipeRepositoryError::not_found(recipe.id.get()))?;
        let image = stored.image.take();
        *stored = Recipe {
            image,
            ..recipe.clone()
        };
        Ok(stored.clone())
    }

    async fn set_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &ImagePath,
    ) -> Result<Option<ImagePath>, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        let stored = state
            .owned_recipe_mut(owner, id)
            .ok_or_else(|| RecipeRepositoryError::not_found(id.get()))?;
        Ok(stored.image.replace(image.clone()))
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<DeletedRecipe>, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        if state.owned_recipe_mut(owner, id).is_none() {
            return Ok(None);
        }
        Ok(state
            .recipes
            .remove(&id)
            .map(|recipe| DeletedRecipe { image: recipe.image }))
    }
}
