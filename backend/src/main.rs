//! Backend entry-point: loads settings, wires adapters and starts the server.

mod server;

use std::io;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipe_api::inbound::http::session_config::{BuildMode, session_settings_from_env};
use recipe_api::outbound::media::FsRecipeImageStore;
use recipe_api::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use recipe_api::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    let media_root = settings.media_root();
    let images = FsRecipeImageStore::open(&media_root).map_err(|e| {
        io::Error::other(format!(
            "failed to open media root {}: {e}",
            media_root.display()
        ))
    })?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        images,
    );

    match settings.database_url() {
        Some(url) => {
            if settings.run_migrations {
                run_pending_migrations(url).await.map_err(io::Error::other)?;
            }
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("RECIPES_DATABASE_URL not set; using in-memory storage (data is lost on restart)");
        }
    }

    info!(bind_addr = %config.bind_addr(), media_root = %media_root.display(), "starting server");
    create_server(config)?.await
}
