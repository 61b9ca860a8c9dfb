//! Recipe image upload handler.
//!
//! The body is the raw image; the original filename, when known, arrives in a
//! `Content-Disposition` header and only contributes its extension.
//!
//! ```text
//! POST /api/v1/recipes/{id}/upload-image
//! Content-Disposition: attachment; filename="soup.jpg"
//! ```

use actix_web::http::header::ContentDisposition;
use actix_web::{post, web};

use crate::domain::{Error, ImageUpload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipe_dto::RecipeImageResponse;
use crate::inbound::http::recipes::RecipePath;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Largest accepted upload body, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Attach an image to one of the caller's recipes.
#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/upload-image",
    params(
        RecipePath,
        ("Content-Disposition" = Option<String>, Header, description = "Carries the original filename")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Not a supported image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 413, description = "Payload too large"),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "uploadRecipeImage",
    security(("SessionCookie" = []))
)]
#[post("/recipes/{id}/upload-image")]
pub async fn upload_recipe_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipePath>,
    disposition: Option<web::Header<ContentDisposition>>,
    body: web::Bytes,
) -> ApiResult<web::Json<RecipeImageResponse>> {
    let user_id = session.require_user_id()?;
    let upload = ImageUpload {
        bytes: body.to_vec(),
        filename: disposition
            .as_ref()
            .and_then(|header| header.get_filename())
            .map(ToOwned::to_owned),
    };
    let recipe = state
        .recipes
        .upload_image(&user_id, path.recipe_id(), upload)
        .await?;
    let image = recipe
        .image
        .map(|path| path.as_str().to_owned())
        .ok_or_else(|| Error::internal("stored recipe has no image path"))?;
    Ok(web::Json(RecipeImageResponse {
        id: recipe.id.get(),
        image,
    }))
}
