//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, plus the services that implement the driving ports. Nothing here
//! depends on actix or Diesel.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, Email, Password: accounts and credentials.
//! - Tag, Ingredient: per-user taxonomy.
//! - Recipe, RecipeDraft, RecipePatch, RecipeFilter: recipes and queries.
//! - ImagePath, recipe_image_file_path: stored image naming.

pub mod auth;
pub mod error;
mod ids;
pub mod password;
pub mod ports;
pub mod recipe;
mod recipe_filter;
pub mod recipe_image;
mod recipe_service;
pub mod taxonomy;
mod taxonomy_service;
pub mod trace_id;
pub mod user;
mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{IngredientId, RecipeId, TagId};
pub use self::password::{HashedPassword, PASSWORD_MIN_LENGTH, Password, PasswordError};
pub use self::recipe::{
    NewRecipe, PRICE_MAX_CENTS, Price, Recipe, RecipeDraft, RecipePatch, RecipeTitle,
    RecipeValidationError, TimeMinutes,
};
pub use self::recipe_filter::RecipeFilter;
pub use self::recipe_image::{
    ImagePath, ImageUpload, ImageValidationError, RECIPE_IMAGE_DIR, ValidatedImage,
    recipe_image_file_path, validate_image,
};
pub use self::recipe_service::{RecipeService, RecipeServicePorts};
pub use self::taxonomy::{Ingredient, Tag, TaxonomyName, TaxonomyValidationError};
pub use self::taxonomy_service::TaxonomyService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, User, UserFlags, UserId, UserName, UserValidationError};
pub use self::user_service::UserAccountService;
