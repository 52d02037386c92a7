mod auth;
mod availability;
mod config;
mod middleware;
mod sms;
mod token;
mod validation;

mod db;
mod error;
mod models;
mod routes;

use std::sync::Arc;

use crate::{config::Config, models::AppState, sms::LogSmsGateway, token::TokenKeys};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Config errors (missing secrets included) abort startup here; they never
    // surface as per-request 500s.
    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;

    let state = AppState {
        db: pool,
        tokens: TokenKeys::new(
            &cfg.access_token_secret,
            &cfg.refresh_token_secret,
            cfg.access_token_ttl_seconds,
            cfg.refresh_token_ttl_seconds,
        ),
        sms: Arc::new(LogSmsGateway),
        sms_test_mode: cfg.sms_test_mode,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
