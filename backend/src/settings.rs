//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, configuration files and `RECIPES_*`
//! environment variables, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
}

/// Configuration values for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; absent means the in-memory store.
    pub database_url: Option<String>,
    /// Directory uploaded images are written under.
    pub media_root: Option<PathBuf>,
    /// Apply embedded migrations on startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Parsed bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the configured value is not a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Media root, falling back to `./media`.
    #[must_use]
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "RECIPES_BIND_ADDR",
        "RECIPES_DATABASE_URL",
        "RECIPES_MEDIA_ROOT",
        "RECIPES_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("recipe-api")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid default")
        );
        assert_eq!(settings.media_root(), PathBuf::from("media"));
        assert!(settings.database_url().is_none());
        assert!(settings.run_migrations);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("RECIPES_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "RECIPES_DATABASE_URL",
                Some("postgres://localhost/recipes".to_owned()),
            ),
            ("RECIPES_MEDIA_ROOT", Some("/srv/media".to_owned())),
            ("RECIPES_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").port(),
            9000
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/recipes"));
        assert_eq!(settings.media_root(), PathBuf::from("/srv/media"));
        assert!(!settings.run_migrations);
    }

    #[rstest]
    #[case("not-an-address")]
    #[case("localhost")]
    fn malformed_bind_addresses_are_rejected(#[case] raw: &str) {
        let settings = AppSettings {
            bind_addr: Some(raw.to_owned()),
            database_url: None,
            media_root: None,
            run_migrations: true,
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { value, .. }) if value == raw
        ));
    }

    #[rstest]
    fn blank_database_urls_mean_in_memory() {
        let settings = AppSettings {
            bind_addr: None,
            database_url: Some("  ".to_owned()),
            media_root: None,
            run_migrations: true,
        };
        assert!(settings.database_url().is_none());
    }
}
