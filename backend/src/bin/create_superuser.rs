//! Create a staff superuser account in PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use clap::Parser;
use recipe_api::domain::UserAccountService;
use recipe_api::domain::ports::{AccountRequest, UserAccounts};
use recipe_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
use tokio::runtime::Builder;
use zeroize::Zeroizing;

const PASSWORD_ENV: &str = "RECIPES_SUPERUSER_PASSWORD";
const DATABASE_URL_ENV: &str = "RECIPES_DATABASE_URL";

/// `create-superuser` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-superuser",
    about = "Create a staff superuser for the recipe API",
    version
)]
struct CliArgs {
    /// Login email for the new account.
    #[arg(long, value_name = "email")]
    email: String,
    /// Password. Falls back to `RECIPES_SUPERUSER_PASSWORD` when omitted.
    #[arg(long, value_name = "password")]
    password: Option<String>,
    /// Optional display name.
    #[arg(long, value_name = "name")]
    name: Option<String>,
    /// Database connection URL. Falls back to `RECIPES_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let password = resolve_value(args.password, PASSWORD_ENV, "--password")?;
    let database_url = resolve_value(args.database_url, DATABASE_URL_ENV, "--database-url")?;

    let pool = DbPool::new(PoolConfig::new(database_url.as_str()))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let accounts = UserAccountService::new(Arc::new(DieselUserRepository::new(pool)));

    let request = AccountRequest {
        email: Some(args.email),
        password,
        name: args.name,
    };
    let user = accounts
        .create_superuser(request)
        .await
        .map_err(|error| io::Error::other(format!("create superuser failed: {error}")))?;

    println!("id={}", user.id());
    println!("email={}", user.email());
    Ok(())
}

/// Prefer the explicit flag, then the environment; reject blank values.
fn resolve_value(
    explicit: Option<String>,
    env_name: &str,
    flag: &str,
) -> io::Result<Zeroizing<String>> {
    let value = match explicit {
        Some(value) => value,
        None => env::var(env_name).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("value missing: set {flag} or {env_name}"),
            )
        })?,
    };
    if value.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} must not be empty"),
        ));
    }
    Ok(Zeroizing::new(value))
}
