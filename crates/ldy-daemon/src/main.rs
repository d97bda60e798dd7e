//! ldy-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads config,
//! connects the store, builds the shared state, wires middleware, and starts
//! the HTTP server. All route handlers live in `routes.rs`; all shared state
//! types live in `state.rs`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use ldy_core::{BookingRules, LaundryDesk};
use ldy_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

const ENV_DAEMON_ADDR: &str = "LDY_DAEMON_ADDR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Production injects env
    // vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let loaded = ldy_config::load_from_env().context("load config")?;
    let cfg = loaded.laundry()?;
    info!(config_hash = %loaded.config_hash, "config loaded");

    let pool = ldy_db::connect_from_env().await?;
    let db = ldy_db::status(&pool).await?;
    if !db.has_orders_table {
        warn!("laundry_orders table missing; run `ldy db migrate` first");
    }

    let desk = LaundryDesk::new(
        Arc::new(ldy_db::PgStore::new(pool)),
        BookingRules::from_config(&cfg),
    );
    let shared = Arc::new(state::AppState::new(desk, loaded.config_hash.clone()));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = match bind_addr_from_env() {
        Some(a) => a,
        None => cfg
            .server
            .addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid server.addr: {}", cfg.server.addr))?,
    };
    info!("ldy-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var(ENV_DAEMON_ADDR).ok()?.parse().ok()
}

/// CORS: allow only localhost origins (the booking web app in dev).
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://localhost:8080",
        "http://127.0.0.1:8080",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
