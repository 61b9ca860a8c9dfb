//! PostgreSQL-backed `TaxonomyRepository` implementation using Diesel ORM.
//!
//! Tags and ingredients share one adapter because they have identical shapes
//! and ownership rules.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TaxonomyRepository, TaxonomyRepositoryError};
use crate::domain::{Ingredient, IngredientId, Tag, TagId, TaxonomyName, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{IngredientRow, NewIngredientRow, NewTagRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, recipe_tags, tags};

/// Diesel-backed implementation of the taxonomy repository port.
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
}

impl DieselTaxonomyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaxonomyRepositoryError {
    map_basic_pool_error(error, TaxonomyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TaxonomyRepositoryError {
    map_basic_diesel_error(
        error,
        TaxonomyRepositoryError::query,
        TaxonomyRepositoryError::connection,
    )
}

pub(super) fn row_to_tag(row: TagRow) -> Tag {
    Tag {
        id: TagId::new(row.id),
        owner: UserId::from_uuid(row.user_id),
        name: row.name,
    }
}

pub(super) fn row_to_ingredient(row: IngredientRow) -> Ingredient {
    Ingredient {
        id: IngredientId::new(row.id),
        owner: UserId::from_uuid(row.user_id),
        name: row.name,
    }
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn insert_tag(
        &self,
        owner: &UserId,
        name: &TaxonomyName,
    ) -> Result<Tag, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(tags::table)
            .values(&NewTagRow {
                user_id: *owner.as_uuid(),
                name: name.as_ref(),
            })
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_tag(row))
    }

    async fn list_tags(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = tags::table
            .select(TagRow::as_select())
            .filter(tags::user_id.eq(*owner.as_uuid()))
            .into_boxed();
        if assigned_only {
            query = query.filter(tags::id.eq_any(recipe_tags::table.select(recipe_tags::tag_id)));
        }
        let rows: Vec<TagRow> = query
            .order((tags::name.desc(), tags::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_tag).collect())
    }

    async fn find_owned_tags(
        &self,
        owner: &UserId,
        ids: &BTreeSet<TagId>,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagRow> = tags::table
            .select(TagRow::as_select())
            .filter(tags::user_id.eq(*owner.as_uuid()))
            .filter(tags::id.eq_any(&raw))
            .order(tags::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_tag).collect())
    }

    async fn insert_ingredient(
        &self,
        owner: &UserId,
        name: &TaxonomyName,
    ) -> Result<Ingredient, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(ingredients::table)
            .values(&NewIngredientRow {
                user_id: *owner.as_uuid(),
                name: name.as_ref(),
            })
            .returning(IngredientRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_ingredient(row))
    }

    async fn list_ingredients(
        &self,
        owner: &UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .filter(ingredients::user_id.eq(*owner.as_uuid()))
            .into_boxed();
        if assigned_only {
            query = query.filter(
                ingredients::id.eq_any(
                    recipe_ingredients::table.select(recipe_ingredients::ingredient_id),
                ),
            );
        }
        let rows: Vec<IngredientRow> = query
            .order((ingredients::name.desc(), ingredients::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }

    async fn find_owned_ingredients(
        &self,
        owner: &UserId,
        ids: &BTreeSet<IngredientId>,
    ) -> Result<Vec<Ingredient>, TaxonomyRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IngredientRow> = ingredients::table
            .select(IngredientRow::as_select())
            .filter(ingredients::user_id.eq(*owner.as_uuid()))
            .filter(ingredients::id.eq_any(&raw))
            .order(ingredients::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }
}
