//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel row structs and domain types and
//! contain no business rules. Row structs (`models.rs`) and the table
//! definitions (`schema.rs`) stay private to this module.
//!
//! Connections come from a `bb8` pool of `diesel-async` connections; pool
//! and driver failures are mapped onto each port's `Connection` and `Query`
//! error variants.
//!
//! # Example
//!
//! ```no_run
//! use recipe_api::outbound::persistence::{DbPool, DieselRecipeRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let recipes = DieselRecipeRepository::new(pool);
//! # let _ = recipes;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_recipe_repository;
mod diesel_taxonomy_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_taxonomy_repository::DieselTaxonomyRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
