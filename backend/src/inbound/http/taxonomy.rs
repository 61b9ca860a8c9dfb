//! Tag and ingredient HTTP handlers.
//!
//! ```text
//! GET  /api/v1/tags?assigned_only=1
//! POST /api/v1/tags {"name":"Vegan"}
//! GET  /api/v1/ingredients?assigned_only=1
//! POST /api/v1/ingredients {"name":"Salt"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Ingredient, Tag};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_flag};

const ASSIGNED_ONLY: FieldName = FieldName::new("assigned_only");

/// A tag or ingredient as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TaxonomyItem {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Vegan")]
    pub name: String,
}

impl From<&Tag> for TaxonomyItem {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id.get(),
            name: tag.name.clone(),
        }
    }
}

impl From<&Ingredient> for TaxonomyItem {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id.get(),
            name: ingredient.name.clone(),
        }
    }
}

/// Body of the create endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TaxonomyRequest {
    pub name: String,
}

/// Query string of the list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaxonomyListQuery {
    /// `1|true` keeps only entries linked to at least one recipe.
    pub assigned_only: Option<String>,
}

impl TaxonomyListQuery {
    fn assigned_only(&self) -> ApiResult<bool> {
        parse_flag(self.assigned_only.as_deref(), ASSIGNED_ONLY)
    }
}

/// List the caller's tags, name descending.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    params(TaxonomyListQuery),
    responses(
        (status = 200, description = "Tags", body = [TaxonomyItem]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags",
    security(("SessionCookie" = []))
)]
#[get("/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TaxonomyListQuery>,
) -> ApiResult<web::Json<Vec<TaxonomyItem>>> {
    let user_id = session.require_user_id()?;
    let assigned_only = query.assigned_only()?;
    let tags = state.taxonomy_query.list_tags(&user_id, assigned_only).await?;
    Ok(web::Json(tags.iter().map(TaxonomyItem::from).collect()))
}

/// Create a tag owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = TaxonomyRequest,
    responses(
        (status = 201, description = "Tag created", body = TaxonomyItem),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "createTag",
    security(("SessionCookie" = []))
)]
#[post("/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TaxonomyRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let tag = state.taxonomy.create_tag(&user_id, &payload.name).await?;
    Ok(HttpResponse::Created().json(TaxonomyItem::from(&tag)))
}

/// List the caller's ingredients, name descending.
#[utoipa::path(
    get,
    path = "/api/v1/ingredients",
    params(TaxonomyListQuery),
    responses(
        (status = 200, description = "Ingredients", body = [TaxonomyItem]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "listIngredients",
    security(("SessionCookie" = []))
)]
#[get("/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TaxonomyListQuery>,
) -> ApiResult<web::Json<Vec<TaxonomyItem>>> {
    let user_id = session.require_user_id()?;
    let assigned_only = query.assigned_only()?;
    let ingredients = state
        .taxonomy_query
        .list_ingredients(&user_id, assigned_only)
        .await?;
    Ok(web::Json(ingredients.iter().map(TaxonomyItem::from).collect()))
}

/// Create an ingredient owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/ingredients",
    request_body = TaxonomyRequest,
    responses(
        (status = 201, description = "Ingredient created", body = TaxonomyItem),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "createIngredient",
    security(("SessionCookie" = []))
)]
#[post("/ingredients")]
pub async fn create_ingredient(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TaxonomyRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let ingredient = state
        .taxonomy
        .create_ingredient(&user_id, &payload.name)
        .await?;
    Ok(HttpResponse::Created().json(TaxonomyItem::from(&ingredient)))
}
