use sea_orm::Database;
use tracing::{info, warn};

use locasso_auth::config::AuthConfig;
use locasso_auth::router::build_router;
use locasso_auth::state::AppState;
use locasso_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.dev_mode {
        warn!("developer mode enabled: developer identity parameters and /api/auth/diagnostic are live");
    }

    let state = AppState {
        db,
        dev_mode: config.dev_mode,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
