use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod state;
mod users;

use crate::{auth::repo::PgUserStore, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "rsvp=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Fails here, before binding, when JWT_SECRET or DATABASE_URL is missing.
    let config = Arc::new(AppConfig::from_env()?);

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let state = AppState::new(config.clone(), Arc::new(PgUserStore::new(pool)));
    let app = app::build_app(state)?;

    app::serve(app, &config.host, config.port).await
}
