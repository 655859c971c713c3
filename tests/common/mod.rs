#![allow(dead_code)]

use axum_test::TestServer;
use diesel::QueryDsl;
use diesel_async::RunQueryDsl;
use order_intake::{
    MIGRATIONS,
    infra::{app_state::AppState, config::AppConfig, db},
    routes,
    schema::orders,
};
use serde_json::{Value, json};
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    // Keeps the database file alive for the duration of the test.
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default()).await
}

pub async fn spawn_app_with(mut config: AppConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    config.database.url = dir
        .path()
        .join("orders.db")
        .to_string_lossy()
        .into_owned();

    db::run_migrations_blocking(MIGRATIONS, &config.database.url)
        .await
        .unwrap();
    let pool = db::create_pool(&config.database).await.unwrap();
    let state = AppState::new(pool, config);
    let server = TestServer::try_new(routes::app(state.clone())).unwrap();

    TestApp {
        server,
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn order_count(&self) -> i64 {
        let mut conn = self.state.db_pool.get().await.unwrap();
        orders::table
            .count()
            .get_result::<i64>(&mut *conn)
            .await
            .unwrap()
    }
}

pub fn ann_lee_order() -> Value {
    json!({
        "customer_name": "Ann Lee",
        "phone": "0123456",
        "address": "12 Main St",
        "city": "Hanoi",
        "payment_method": "COD",
        "items": [{"name": "Shirt", "price": 10, "quantity": 2}]
    })
}
