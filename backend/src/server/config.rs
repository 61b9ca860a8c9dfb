//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use recipe_api::outbound::media::FsRecipeImageStore;
use recipe_api::outbound::memory::InMemoryPersistence;
use recipe_api::outbound::persistence::DbPool;
use std::net::SocketAddr;

/// Storage backing the repository ports.
#[derive(Clone)]
pub enum Persistence {
    /// Process-local maps; data is lost on restart.
    InMemory(InMemoryPersistence),
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) persistence: Persistence,
    pub(crate) images: FsRecipeImageStore,
}

impl ServerConfig {
    /// Construct a server configuration backed by in-memory storage.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        images: FsRecipeImageStore,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            persistence: Persistence::InMemory(InMemoryPersistence::new()),
            images,
        }
    }

    /// Attach a database connection pool for the Diesel adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.persistence = Persistence::Postgres(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
