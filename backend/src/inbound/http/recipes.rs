//! Recipe HTTP handlers.
//!
//! ```text
//! GET    /api/v1/recipes?tags=1,2&ingredients=3
//! POST   /api/v1/recipes
//! GET    /api/v1/recipes/{id}
//! PUT    /api/v1/recipes/{id}
//! PATCH  /api/v1/recipes/{id}
//! DELETE /api/v1/recipes/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{IngredientId, RecipeDraft, RecipeFilter, RecipeId, RecipePatch, TagId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipe_dto::{
    RecipeDetail, RecipePatchRequest, RecipeRequest, RecipeSummary,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id_list};

const TAGS: FieldName = FieldName::new("tags");
const INGREDIENTS: FieldName = FieldName::new("ingredients");

/// Relation filters for the list endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids; a recipe matches when it has any of them.
    #[param(example = "1,2")]
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe matches when it uses any of
    /// them.
    #[param(example = "3")]
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    fn into_filter(self) -> ApiResult<RecipeFilter> {
        let mut filter = RecipeFilter::default();
        if let Some(raw) = self.tags {
            filter = filter.with_tags(parse_id_list::<TagId>(&raw, TAGS)?);
        }
        if let Some(raw) = self.ingredients {
            filter = filter.with_ingredients(parse_id_list::<IngredientId>(&raw, INGREDIENTS)?);
        }
        Ok(filter)
    }
}

/// Path parameters addressing one recipe.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct RecipePath {
    /// Recipe identifier.
    pub id: i64,
}

impl RecipePath {
    pub(crate) const fn recipe_id(&self) -> RecipeId {
        RecipeId::new(self.id)
    }
}

/// List the caller's recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = [RecipeSummary]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security(("SessionCookie" = []))
)]
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeSummary>>> {
    let user_id = session.require_user_id()?;
    let filter = query.into_inner().into_filter()?;
    let recipes = state.recipes_query.list(&user_id, filter).await?;
    Ok(web::Json(recipes.iter().map(RecipeSummary::from).collect()))
}

/// Create a recipe owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeSummary),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe",
    security(("SessionCookie" = []))
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = RecipeDraft::try_from(payload.into_inner())?;
    let recipe = state.recipes.create(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(RecipeSummary::from(&recipe)))
}

/// Fetch one recipe with its tags and ingredients.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(RecipePath),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetail),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security(("SessionCookie" = []))
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipePath>,
) -> ApiResult<web::Json<RecipeDetail>> {
    let user_id = session.require_user_id()?;
    let recipe = state.recipes_query.get(&user_id, path.recipe_id()).await?;
    Ok(web::Json(RecipeDetail::from(&recipe)))
}

/// Replace every field of a recipe; omitted relations are cleared.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    params(RecipePath),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe replaced", body = RecipeSummary),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe",
    security(("SessionCookie" = []))
)]
#[put("/recipes/{id}")]
pub async fn replace_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipePath>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeSummary>> {
    let user_id = session.require_user_id()?;
    let draft = RecipeDraft::try_from(payload.into_inner())?;
    let recipe = state
        .recipes
        .update(&user_id, path.recipe_id(), RecipePatch::from(draft))
        .await?;
    Ok(web::Json(RecipeSummary::from(&recipe)))
}

/// Change only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    params(RecipePath),
    request_body = RecipePatchRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeSummary),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe",
    security(("SessionCookie" = []))
)]
#[patch("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipePath>,
    payload: web::Json<RecipePatchRequest>,
) -> ApiResult<web::Json<RecipeSummary>> {
    let user_id = session.require_user_id()?;
    let patch = RecipePatch::try_from(payload.into_inner())?;
    let recipe = state
        .recipes
        .update(&user_id, path.recipe_id(), patch)
        .await?;
    Ok(web::Json(RecipeSummary::from(&recipe)))
}

/// Delete a recipe and its stored image.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(RecipePath),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe",
    security(("SessionCookie" = []))
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipePath>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.recipes.delete(&user_id, path.recipe_id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
