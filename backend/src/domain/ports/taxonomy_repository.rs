//! Port for tag and ingredient persistence.
//!
//! Every method is scoped to an owner: rows belonging to other users are
//! invisible to the caller.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Ingredient, IngredientId, Tag, TagId, TaxonomyName, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by taxonomy repository adapters.
    pub enum TaxonomyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "taxonomy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "taxonomy repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Insert a tag for `owner`.
    async fn insert_tag(
        &self,
        owner: &UserId,
        name: &TaxonomyName,
    ) -> Result<Tag, TaxonomyRepositoryError>;

    /// List the owner's tags, name then id descending. With
    /// `assigned_only`, only tags linked to at least one recipe.
    async fn list_tags(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError>;

    /// Subset of `ids` that exist and belong to `owner`.
    async fn find_owned_tags(
        &self,
        owner: &UserId,
        ids: &BTreeSet<TagId>,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError>;

    /// Insert an ingredient for `owner`.
    async fn insert_ingredient(
        &self,
        owner: &UserId,
        name: &TaxonomyName,
    ) -> Result<Ingredient, TaxonomyRepositoryError>;

    /// List the owner's ingredients, name then id descending.
    async fn list_ingredients(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, TaxonomyRepositoryError>;

    /// Subset of `ids` that exist and belong to `owner`.
    async fn find_owned_ingredients(
        &self,
        owner: &UserId,
        ids: &BTreeSet<IngredientId>,
    ) -> Result<Vec<Ingredient>, TaxonomyRepositoryError>;
}
