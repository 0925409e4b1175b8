//! HTTP server for the camera relay
//!
//! Exposes a single route, `POST /`. Anything else gets axum's default
//! 404/405 responses.

use anyhow::Result;
use axum::{routing::post, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::types::Config;

/// Start the server with the gphoto2 runner and block until it exits
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind_addr();
    let state = AppState::with_gphoto(config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Camera relay listening on http://{}", listener.local_addr()?);

    serve_on(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    let app = create_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::run_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
