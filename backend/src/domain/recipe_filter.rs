//! Relation filters for recipe listings.
//!
//! A recipe matches when, for every axis that is present, its related id set
//! intersects the requested set. An absent axis places no restriction; a
//! present but empty set matches nothing on that axis.

use std::collections::BTreeSet;

use super::{IngredientId, Recipe, TagId};

/// Stateless filter over a recipe's tags and ingredients.
///
/// # Examples
/// ```
/// use recipe_api::domain::{RecipeFilter, TagId};
///
/// let filter = RecipeFilter::default().with_tags([TagId::new(1), TagId::new(2)]);
/// assert!(!filter.is_unrestricted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Requested tag ids, if filtering by tag.
    pub tag_ids: Option<BTreeSet<TagId>>,
    /// Requested ingredient ids, if filtering by ingredient.
    pub ingredient_ids: Option<BTreeSet<IngredientId>>,
}

impl RecipeFilter {
    /// Restrict to recipes carrying any of `tags`.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tag_ids = Some(tags.into_iter().collect());
        self
    }

    /// Restrict to recipes using any of `ingredients`.
    #[must_use]
    pub fn with_ingredients(mut self, ingredients: impl IntoIterator<Item = IngredientId>) -> Self {
        self.ingredient_ids = Some(ingredients.into_iter().collect());
        self
    }

    /// True when neither axis is restricted.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.tag_ids.is_none() && self.ingredient_ids.is_none()
    }

    /// Whether `recipe` passes every present axis.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        axis_matches(self.tag_ids.as_ref(), recipe.tags.iter().map(|tag| tag.id))
            && axis_matches(
                self.ingredient_ids.as_ref(),
                recipe.ingredients.iter().map(|ingredient| ingredient.id),
            )
    }

    /// Keep the matching recipes, preserving input order.
    #[must_use]
    pub fn apply(&self, recipes: Vec<Recipe>) -> Vec<Recipe> {
        recipes
            .into_iter()
            .filter(|recipe| self.matches(recipe))
            .collect()
    }
}

fn axis_matches<T: Ord>(requested: Option<&BTreeSet<T>>, mut related: impl Iterator<Item = T>) -> bool {
    requested.is_none_or(|wanted| related.any(|id| wanted.contains(&id)))
}
