use std::path::Path;

use anyhow::{Context, Result, anyhow};
use diesel::{
    connection::SimpleConnection,
    result::{ConnectionError, ConnectionResult},
    sqlite::SqliteConnection,
};
use diesel_async::{
    AsyncConnection, SimpleAsyncConnection,
    pooled_connection::{AsyncDieselConnectionManager, ManagerConfig, bb8::Pool},
    sync_connection_wrapper::SyncConnectionWrapper,
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use futures::future::BoxFuture;

use crate::infra::config::DatabaseConfig;

pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;
pub type DbPool = Pool<DbConnection>;

/// Applied to every pooled connection. Writers wait on each other instead of
/// failing with `SQLITE_BUSY`.
const CONNECTION_PRAGMAS: &str = "
    PRAGMA busy_timeout = 5000;
    PRAGMA synchronous = NORMAL;
    PRAGMA foreign_keys = ON;
";

pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup = Box::new(establish_connection);
    let manager =
        AsyncDieselConnectionManager::<DbConnection>::new_with_config(&config.url, manager_config);

    Pool::builder()
        .max_size(config.pool_size.max(1))
        .build(manager)
        .await
        .context("Failed to build the DB connection pool")
}

fn establish_connection(url: &str) -> BoxFuture<'_, ConnectionResult<DbConnection>> {
    Box::pin(async move {
        let mut conn = <DbConnection as AsyncConnection>::establish(url).await?;
        SimpleAsyncConnection::batch_execute(&mut conn, CONNECTION_PRAGMAS)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    })
}

/// Switches the database to WAL mode and applies pending migrations on a
/// blocking thread. Returns the number of migrations that ran.
pub async fn run_migrations_blocking(migrations: EmbeddedMigrations, url: &str) -> Result<usize> {
    let url = url.to_owned();
    tokio::task::spawn_blocking(move || -> Result<usize> {
        ensure_parent_dir(&url)?;

        let mut conn = <SqliteConnection as diesel::Connection>::establish(&url)
            .with_context(|| format!("Failed to open database {}", url))?;
        SimpleConnection::batch_execute(&mut conn, "PRAGMA journal_mode = WAL;")
            .context("Failed to enable WAL journal mode")?;

        let applied = conn
            .run_pending_migrations(migrations)
            .map_err(|err| anyhow!(err))
            .context("Failed to run migrations")?;
        Ok(applied.len())
    })
    .await
    .context("Migration task panicked")?
}

fn ensure_parent_dir(url: &str) -> Result<()> {
    if url == ":memory:" || url.starts_with("file:") {
        return Ok(());
    }
    match Path::new(url).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}
