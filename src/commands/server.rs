//! HTTP API Server
//!
//! Axum router for the converter API plus the serve loop with graceful
//! shutdown on Ctrl-C.

use std::any::Any;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    http::Method,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::convert_commands::{self, AppState};
use crate::domain::conversion::ConversionError;
use crate::infrastructure::config::ServerConfig;

/// Create the API router with all routes mounted under `/api`
pub fn create_router(state: AppState, cors_enabled: bool) -> Router {
    let api = Router::new()
        .route("/convert-link", post(convert_commands::convert_link))
        .route("/health", get(convert_commands::health))
        .with_state(state);

    with_layers(Router::new().nest("/api", api), cors_enabled)
}

fn with_layers(mut app: Router, cors_enabled: bool) -> Router {
    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(AnyOrigin)
            .allow_origin(AnyOrigin);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Handler panicked: {}", detail);
    ConversionError::Internal(detail).into_response()
}

/// Bind `config.listen_addr` and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .context("Invalid HTTP listen address")?;

    let app = create_router(state, config.cors_enabled);

    let listener = TcpListener::bind(&addr)
        .await
        .context("Failed to bind HTTP server")?;

    info!("HTTP API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("HTTP server shutting down");
}
