//! Tag and ingredient use-cases.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    TaxonomyCommand, TaxonomyQuery, TaxonomyRepository, TaxonomyRepositoryError,
};
use crate::domain::{Error, Ingredient, Tag, TaxonomyName, TaxonomyValidationError, UserId};

/// Taxonomy service implementing the taxonomy driving ports.
#[derive(Clone)]
pub struct TaxonomyService<T> {
    taxonomy: Arc<T>,
}

impl<T> TaxonomyService<T> {
    /// Create a new service over the given repository.
    pub fn new(taxonomy: Arc<T>) -> Self {
        Self { taxonomy }
    }
}

pub(crate) fn map_taxonomy_error(error: TaxonomyRepositoryError) -> Error {
    match error {
        TaxonomyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("taxonomy repository unavailable: {message}"))
        }
        TaxonomyRepositoryError::Query { message } => {
            Error::internal(format!("taxonomy repository error: {message}"))
        }
    }
}

fn parse_name(raw: &str) -> Result<TaxonomyName, Error> {
    TaxonomyName::new(raw).map_err(|err| {
        let code = match err {
            TaxonomyValidationError::EmptyName => "required",
            TaxonomyValidationError::NameTooLong { .. } => "too_long",
        };
        Error::invalid_field("name", code, err.to_string())
    })
}

#[async_trait]
impl<T> TaxonomyCommand for TaxonomyService<T>
where
    T: TaxonomyRepository,
{
    async fn create_tag(&self, owner: &UserId, name: &str) -> Result<Tag, Error> {
        let name = parse_name(name)?;
        let tag = self
            .taxonomy
            .insert_tag(owner, &name)
            .await
            .map_err(map_taxonomy_error)?;
        tracing::debug!(tag_id = %tag.id, user_id = %owner, "tag created");
        Ok(tag)
    }

    async fn create_ingredient(&self, owner: &UserId, name: &str) -> Result<Ingredient, Error> {
        let name = parse_name(name)?;
        let ingredient = self
            .taxonomy
            .insert_ingredient(owner, &name)
            .await
            .map_err(map_taxonomy_error)?;
        tracing::debug!(ingredient_id = %ingredient.id, user_id = %owner, "ingredient created");
        Ok(ingredient)
    }
}

#[async_trait]
impl<T> TaxonomyQuery for TaxonomyService<T>
where
    T: TaxonomyRepository,
{
    async fn list_tags(&self, owner: &UserId, assigned_only: bool) -> Result<Vec<Tag>, Error> {
        self.taxonomy
            .list_tags(owner, assigned_only)
            .await
            .map_err(map_taxonomy_error)
    }

    async fn list_ingredients(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, Error> {
        self.taxonomy
            .list_ingredients(owner, assigned_only)
            .await
            .map_err(map_taxonomy_error)
    }
}
