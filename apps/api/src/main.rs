mod accounts;
mod auth;
mod config;
mod db;
mod directory;
mod errors;
mod listing;
mod outreach;
mod routes;
mod selection;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::accounts::roster::Roster;
use crate::auth::client::AuthClient;
use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::db::{create_pool, create_redis_client};
use crate::outreach::proxy::GenerationClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Herald API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize the Redis-backed session store
    let sessions = SessionStore::new(create_redis_client(&config.redis_url)?);

    // Collaborator clients: auth service and generation proxy
    let auth = AuthClient::new(config.auth_base_url.clone(), config.platform_api_key.clone());
    let generation = GenerationClient::new(
        config.generation_base_url.clone(),
        config.platform_api_key.clone(),
    );
    info!("Collaborator clients initialized");

    // Build app state
    let state = AppState {
        db,
        sessions,
        auth,
        generation,
        roster: Arc::new(Roster::new()),
        config: config.clone(),
    };

    // Background task: initial roster load + realtime change feed
    tokio::spawn(accounts::feed::run(state.clone()));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
