//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the image store, the name generator) are
//! implemented by outbound adapters. Driving ports (accounts, login,
//! taxonomy, recipes) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod image_names;
mod login_service;
mod recipe_command;
mod recipe_image_store;
mod recipe_query;
mod recipe_repository;
mod taxonomy_command;
mod taxonomy_query;
mod taxonomy_repository;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use image_names::MockImageNameGenerator;
pub use image_names::{ImageNameGenerator, UuidImageNames};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use recipe_command::MockRecipeCommand;
pub use recipe_command::RecipeCommand;
#[cfg(test)]
pub use recipe_image_store::MockRecipeImageStore;
pub use recipe_image_store::{ImageStoreError, RecipeImageStore};
#[cfg(test)]
pub use recipe_query::MockRecipeQuery;
pub use recipe_query::RecipeQuery;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{DeletedRecipe, RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use taxonomy_command::MockTaxonomyCommand;
pub use taxonomy_command::TaxonomyCommand;
#[cfg(test)]
pub use taxonomy_query::MockTaxonomyQuery;
pub use taxonomy_query::TaxonomyQuery;
#[cfg(test)]
pub use taxonomy_repository::MockTaxonomyRepository;
pub use taxonomy_repository::{TaxonomyRepository, TaxonomyRepositoryError};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::{AccountRequest, ProfileUpdate, UserAccounts};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
