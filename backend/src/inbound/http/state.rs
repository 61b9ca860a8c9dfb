//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! can be exercised with mocks and without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, RecipeCommand, RecipeQuery, TaxonomyCommand, TaxonomyQuery, UserAccounts,
};

/// Parameter object bundling every port the handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccounts>,
    pub taxonomy: Arc<dyn TaxonomyCommand>,
    pub taxonomy_query: Arc<dyn TaxonomyQuery>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccounts>,
    pub taxonomy: Arc<dyn TaxonomyCommand>,
    pub taxonomy_query: Arc<dyn TaxonomyQuery>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            taxonomy,
            taxonomy_query,
            recipes,
            recipes_query,
        } = ports;
        Self {
            login,
            accounts,
            taxonomy,
            taxonomy_query,
            recipes,
            recipes_query,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
