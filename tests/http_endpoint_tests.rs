//! In-process HTTP tests for routes that don't depend on the caller's
//! address. `create_room`/`join_room` need a real peer address for rate
//! limiting (`ConnectInfo<SocketAddr>`), so those scenarios are covered in
//! `e2e_tests.rs` against a real bound listener instead.

use std::sync::Arc;

use async_trait::async_trait;
use parlour_server::config::{RateLimitConfig, ServerRuntimeConfig};
use parlour_server::database::{ConnectionStringDatabase, Database};
use parlour_server::state::AppState;
use parlour_server::websocket::create_router;

fn test_state(database: Arc<dyn Database>) -> Arc<AppState> {
    Arc::new(AppState::with_config(database, &ServerRuntimeConfig::default(), &RateLimitConfig::default()))
}

#[tokio::test]
async fn health_db_reports_healthy_for_a_well_formed_connection_string() {
    let database = Arc::new(ConnectionStringDatabase::new("postgres://localhost/test").unwrap());
    let app = create_router(test_state(database), "*");
    let server = axum_test::TestServer::new(app).expect("test server should start");

    let response = server.get("/api/health/db").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

struct UnreachableDatabase;

#[async_trait]
impl Database for UnreachableDatabase {
    async fn health_check(&self) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

#[tokio::test]
async fn health_db_reports_unhealthy_when_the_store_is_unreachable() {
    let app = create_router(test_state(Arc::new(UnreachableDatabase)), "*");
    let server = axum_test::TestServer::new(app).expect("test server should start");

    let response = server.get("/api/health/db").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["error"], "connection refused");
}
