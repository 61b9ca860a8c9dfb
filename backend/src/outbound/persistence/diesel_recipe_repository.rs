//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! Recipe rows and their link rows are written in one transaction. Reads load
//! the recipe rows first, then both link sets for the whole page in two
//! joined queries, so listing costs three round-trips regardless of size.
//!
//! Detail updates never write the `image` column. Image swaps lock the row
//! with `SELECT ... FOR UPDATE` so the replaced path is read and overwritten
//! atomically.

use std::collections::BTreeMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{DeletedRecipe, RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    ImagePath, Ingredient, NewRecipe, Price, Recipe, RecipeFilter, RecipeId, RecipeTitle, Tag,
    TimeMinutes, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_taxonomy_repository::{row_to_ingredient, row_to_tag};
use super::models::{
    IngredientRow, NewRecipeRow, RecipeIngredientRow, RecipeRow, RecipeTagRow, RecipeUpdate,
    TagRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};

/// Diesel-backed implementation of the recipe repository port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    map_basic_pool_error(error, RecipeRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> RecipeRepositoryError {
    map_basic_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

/// Scalar columns of a recipe in their database representation.
struct RecipeColumns<'a> {
    title: &'a str,
    time_minutes: i32,
    price_cents: i32,
}

fn recipe_columns<'a>(
    title: &'a RecipeTitle,
    time_minutes: TimeMinutes,
    price: Price,
) -> Result<RecipeColumns<'a>, RecipeRepositoryError> {
    let price_cents = i32::try_from(price.cents())
        .map_err(|_| RecipeRepositoryError::query(format!("price {price} exceeds column range")))?;
    Ok(RecipeColumns {
        title: title.as_ref(),
        time_minutes: time_minutes.get(),
        price_cents,
    })
}

fn tag_links(recipe_id: i64, tags: &[Tag]) -> Vec<RecipeTagRow> {
    tags.iter()
        .map(|tag| RecipeTagRow {
            recipe_id,
            tag_id: tag.id.get(),
        })
        .collect()
}

fn ingredient_links(recipe_id: i64, ingredients: &[Ingredient]) -> Vec<RecipeIngredientRow> {
    ingredients
        .iter()
        .map(|ingredient| RecipeIngredientRow {
            recipe_id,
            ingredient_id: ingredient.id.get(),
        })
        .collect()
}

fn row_to_recipe(
    row: RecipeRow,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
) -> Result<Recipe, RecipeRepositoryError> {
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        RecipeRepositoryError::query(format!("stored recipe {} has invalid {field}: {err}", row.id))
    };
    let title = RecipeTitle::new(&row.title).map_err(|err| corrupt("title", &err))?;
    let time_minutes =
        TimeMinutes::new(i64::from(row.time_minutes)).map_err(|err| corrupt("time", &err))?;
    let price = Price::from_cents(i64::from(row.price_cents)).map_err(|err| corrupt("price", &err))?;
    Ok(Recipe {
        id: RecipeId::new(row.id),
        owner: UserId::from_uuid(row.user_id),
        title,
        time_minutes,
        price,
        tags,
        ingredients,
        image: row.image.map(ImagePath::from_stored),
    })
}

/// Resolved link rows keyed by recipe id.
#[derive(Default)]
struct Relations {
    tags: BTreeMap<i64, Vec<Tag>>,
    ingredients: BTreeMap<i64, Vec<Ingredient>>,
}

async fn load_relations(
    conn: &mut AsyncPgConnection,
    recipe_ids: &[i64],
) -> Result<Relations, DieselError> {
    let mut relations = Relations::default();
    if recipe_ids.is_empty() {
        return Ok(relations);
    }

    let tag_rows: Vec<(i64, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids))
        .order(tags::id.asc())
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await?;
    for (recipe_id, row) in tag_rows {
        relations
            .tags
            .entry(recipe_id)
            .or_default()
            .push(row_to_tag(row));
    }

    let ingredient_rows: Vec<(i64, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .order(ingredients::id.asc())
        .select((recipe_ingredients::recipe_id, IngredientRow::as_select()))
        .load(conn)
        .await?;
    for (recipe_id, row) in ingredient_rows {
        relations
            .ingredients
            .entry(recipe_id)
            .or_default()
            .push(row_to_ingredient(row));
    }

    Ok(relations)
}

fn assemble(
    rows: Vec<RecipeRow>,
    mut relations: Relations,
) -> Result<Vec<Recipe>, RecipeRepositoryError> {
    rows.into_iter()
        .map(|row| {
            let tags = relations.tags.remove(&row.id).unwrap_or_default();
            let ingredients = relations.ingredients.remove(&row.id).unwrap_or_default();
            row_to_recipe(row, tags, ingredients)
        })
        .collect()
}

async fn load_filtered(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    filter: &RecipeFilter,
) -> Result<(Vec<RecipeRow>, Relations), DieselError> {
    let mut query = recipes::table
        .select(RecipeRow::as_select())
        .filter(recipes::user_id.eq(owner))
        .into_boxed();
    if let Some(tag_ids) = &filter.tag_ids {
        let raw: Vec<i64> = tag_ids.iter().map(|id| id.get()).collect();
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(raw))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }
    if let Some(ingredient_ids) = &filter.ingredient_ids {
        let raw: Vec<i64> = ingredient_ids.iter().map(|id| id.get()).collect();
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq_any(raw))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    let rows: Vec<RecipeRow> = query.order(recipes::id.desc()).load(conn).await?;
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let relations = load_relations(conn, &ids).await?;
    Ok((rows, relations))
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn insert(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let columns = recipe_columns(&recipe.title, recipe.time_minutes, recipe.price)?;
        let new_row = NewRecipeRow {
            user_id: *recipe.owner.as_uuid(),
            title: columns.title,
            time_minutes: columns.time_minutes,
            price_cents: columns.price_cents,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let row: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&new_row)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let tag_rows = tag_links(row.id, &recipe.tags);
                    if !tag_rows.is_empty() {
                        diesel::insert_into(recipe_tags::table)
                            .values(&tag_rows)
                            .execute(conn)
                            .await?;
                    }
                    let ingredient_rows = ingredient_links(row.id, &recipe.ingredients);
                    if !ingredient_rows.is_empty() {
                        diesel::insert_into(recipe_ingredients::table)
                            .values(&ingredient_rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, DieselError>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_recipe(row, recipe.tags.clone(), recipe.ingredients.clone())
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let owner = *owner.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let row: Option<RecipeRow> = recipes::table
                        .select(RecipeRow::as_select())
                        .filter(recipes::id.eq(id.get()))
                        .filter(recipes::user_id.eq(owner))
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    let relations = load_relations(conn, &[row.id]).await?;
                    Ok::<_, DieselError>(Some((row, relations)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match loaded {
            Some((row, relations)) => Ok(assemble(vec![row], relations)?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let empty_axis = filter.tag_ids.as_ref().is_some_and(|ids| ids.is_empty())
            || filter.ingredient_ids.as_ref().is_some_and(|ids| ids.is_empty());
        if empty_axis {
            return Ok(Vec::new());
        }

        let owner = *owner.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (rows, relations) = conn
            .transaction(|conn| async move { load_filtered(conn, owner, filter).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?;
        assemble(rows, relations)
    }

    async fn update_details(&self, recipe: &Recipe) -> Result<Recipe, RecipeRepositoryError> {
        let columns = recipe_columns(&recipe.title, recipe.time_minutes, recipe.price)?;
        let changes = RecipeUpdate {
            title: columns.title,
            time_minutes: columns.time_minutes,
            price_cents: columns.price_cents,
        };
        let recipe_id = recipe.id.get();
        let owner = *recipe.owner.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction(|conn| {
                async move {
                    let row: RecipeRow = diesel::update(
                        recipes::table
                            .filter(recipes::id.eq(recipe_id))
                            .filter(recipes::user_id.eq(owner)),
                    )
                    .set(&changes)
                    .returning(RecipeRow::as_returning())
                    .get_result(conn)
                    .await?;

                    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                        .execute(conn)
                        .await?;
                    let tag_rows = tag_links(recipe_id, &recipe.tags);
                    if !tag_rows.is_empty() {
                        diesel::insert_into(recipe_tags::table)
                            .values(&tag_rows)
                            .execute(conn)
                            .await?;
                    }

                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;
                    let ingredient_rows = ingredient_links(recipe_id, &recipe.ingredients);
                    if !ingredient_rows.is_empty() {
                        diesel::insert_into(recipe_ingredients::table)
                            .values(&ingredient_rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, DieselError>(row)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(row) => row_to_recipe(row, recipe.tags.clone(), recipe.ingredients.clone()),
            Err(DieselError::NotFound) => Err(RecipeRepositoryError::not_found(recipe_id)),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn set_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &ImagePath,
    ) -> Result<Option<ImagePath>, RecipeRepositoryError> {
        let recipe_id = id.get();
        let owner = *owner.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction(|conn| {
                async move {
                    let previous: Option<String> = recipes::table
                        .filter(recipes::id.eq(recipe_id))
                        .filter(recipes::user_id.eq(owner))
                        .select(recipes::image)
                        .for_update()
                        .first(conn)
                        .await?;
                    diesel::update(recipes::table.filter(recipes::id.eq(recipe_id)))
                        .set(recipes::image.eq(Some(image.as_str())))
                        .execute(conn)
                        .await?;
                    Ok::<_, DieselError>(previous)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(previous) => Ok(previous.map(ImagePath::from_stored)),
            Err(DieselError::NotFound) => Err(RecipeRepositoryError::not_found(recipe_id)),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<DeletedRecipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed: Option<Option<String>> = diesel::delete(
            recipes::table
                .filter(recipes::id.eq(id.get()))
                .filter(recipes::user_id.eq(owner.as_uuid())),
        )
        .returning(recipes::image)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(removed.map(|image| DeletedRecipe {
            image: image.map(ImagePath::from_stored),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row mapping.
    use super::*;
    use crate::domain::TagId;
    use rstest::rstest;

    fn row(time_minutes: i32, price_cents: i32) -> RecipeRow {
        RecipeRow {
            id: 3,
            user_id: Uuid::new_v4(),
            title: "Sample recipe".to_owned(),
            time_minutes,
            price_cents,
            image: Some("uploads/recipe/a.jpg".to_owned()),
        }
    }

    #[rstest]
    fn rows_map_to_recipes() {
        let recipe = row_to_recipe(row(10, 550), Vec::new(), Vec::new()).expect("valid row");
        assert_eq!(recipe.id, RecipeId::new(3));
        assert_eq!(recipe.price.to_string(), "5.50");
        assert_eq!(
            recipe.image.as_ref().map(ImagePath::as_str),
            Some("uploads/recipe/a.jpg")
        );
    }

    #[rstest]
    #[case(0, 100)]
    #[case(10, -1)]
    #[case(10, 100_000)]
    fn corrupt_rows_are_query_errors(#[case] time_minutes: i32, #[case] price_cents: i32) {
        let err = row_to_recipe(row(time_minutes, price_cents), Vec::new(), Vec::new())
            .expect_err("must fail");
        assert!(matches!(err, RecipeRepositoryError::Query { .. }));
    }

    #[rstest]
    fn relations_are_attached_by_recipe_id() {
        let owner = UserId::random();
        let mut relations = Relations::default();
        relations.tags.insert(
            3,
            vec![Tag {
                id: TagId::new(9),
                owner,
                name: "Vegan".to_owned(),
            }],
        );
        let recipes = assemble(vec![row(10, 100)], relations).expect("assembles");
        assert_eq!(recipes[0].tags.len(), 1);
        assert!(recipes[0].ingredients.is_empty());
    }

    #[rstest]
    fn link_rows_follow_the_recipe_id() {
        let owner = UserId::random();
        let tags = vec![Tag {
            id: TagId::new(4),
            owner,
            name: "Dinner".to_owned(),
        }];
        let rows = tag_links(11, &tags);
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].recipe_id, rows[0].tag_id), (11, 4));
    }
}
