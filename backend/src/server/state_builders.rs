//! Builders wiring repository adapters into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;

use recipe_api::domain::ports::{
    RecipeImageStore, RecipeRepository, TaxonomyRepository, UserRepository, UuidImageNames,
};
use recipe_api::domain::{RecipeService, RecipeServicePorts, TaxonomyService, UserAccountService};
use recipe_api::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_api::outbound::persistence::{
    DieselRecipeRepository, DieselTaxonomyRepository, DieselUserRepository,
};

use super::ServerConfig;
use super::config::Persistence;

/// Driven adapters behind the domain services.
struct Repositories<U, T, R> {
    users: Arc<U>,
    taxonomy: Arc<T>,
    recipes: Arc<R>,
}

fn build_ports<U, T, R, S>(repositories: Repositories<U, T, R>, images: Arc<S>) -> HttpStatePorts
where
    U: UserRepository + 'static,
    T: TaxonomyRepository + 'static,
    R: RecipeRepository + 'static,
    S: RecipeImageStore + 'static,
{
    let Repositories {
        users,
        taxonomy,
        recipes,
    } = repositories;

    let accounts = Arc::new(UserAccountService::new(users));
    let taxonomy_service = Arc::new(TaxonomyService::new(Arc::clone(&taxonomy)));
    let recipe_service = Arc::new(RecipeService::new(RecipeServicePorts {
        recipes,
        taxonomy,
        images,
        names: Arc::new(UuidImageNames),
    }));

    HttpStatePorts {
        login: accounts.clone(),
        accounts,
        taxonomy: taxonomy_service.clone(),
        taxonomy_query: taxonomy_service,
        recipes: recipe_service.clone(),
        recipes_query: recipe_service,
    }
}

/// Build the shared handler state from the configured storage.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let images = Arc::new(config.images.clone());
    let ports = match &config.persistence {
        Persistence::InMemory(store) => {
            let store = Arc::new(store.clone());
            build_ports(
                Repositories {
                    users: Arc::clone(&store),
                    taxonomy: Arc::clone(&store),
                    recipes: store,
                },
                images,
            )
        }
        Persistence::Postgres(pool) => build_ports(
            Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                taxonomy: Arc::new(DieselTaxonomyRepository::new(pool.clone())),
                recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            },
            images,
        ),
    };
    web::Data::new(HttpState::new(ports))
}
