use anyhow::Result;
use order_intake::{
    MIGRATIONS,
    infra::{app_state::AppState, bootstrap, config, db},
    routes,
};

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = bootstrap::init_env()?;
    bootstrap::init_tracing();
    if let Some(path) = env_file {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let config = config::load()?;

    tracing::info!("Running migrations on {}...", config.database.url);
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let db_pool = db::create_pool(&config.database).await?;
    let server = config.server.clone();
    let app = routes::app(AppState::new(db_pool, config));

    tracing::info!("Bootstrapping...");
    bootstrap::serve("OrderIntake", app, &server).await
}
