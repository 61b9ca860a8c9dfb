//! HTTP inbound adapter exposing REST endpoints.
//!
//! [`configure`] mounts every handler plus the extractor settings they rely
//! on; callers wrap it in the `/api/v1` scope.

pub mod error;
pub mod recipe_dto;
pub mod recipe_images;
pub mod recipes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod taxonomy;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};

use crate::domain::Error;

pub use error::ApiResult;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            err.into()
        }
        other => Error::invalid_request(format!("invalid JSON body: {other}")).into(),
    }
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

fn path_error(_err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::not_found("resource not found").into()
}

/// Register handlers and extractor configuration.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use recipe_api::inbound::http::configure;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::PayloadConfig::new(recipe_images::MAX_IMAGE_BYTES))
        .service(users::create_user)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(taxonomy::list_tags)
        .service(taxonomy::create_tag)
        .service(taxonomy::list_ingredients)
        .service(taxonomy::create_ingredient)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::get_recipe)
        .service(recipes::replace_recipe)
        .service(recipes::update_recipe)
        .service(recipes::delete_recipe)
        .service(recipe_images::upload_recipe_image);
}
