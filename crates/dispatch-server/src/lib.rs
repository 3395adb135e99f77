pub mod routes;
pub mod state;
pub mod triggers;

use axum::routing::{get, post};
use axum::Router;
use dispatch_core::config::DispatchConfig;
use tower_http::trace::TraceLayer;

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/events", post(routes::webhook::handle_event))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the dispatcher webhook server.
pub async fn serve(config: DispatchConfig, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(config, listener).await
}

/// Start the dispatcher on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    config: DispatchConfig,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app_state = state::AppState::new(config)?;
    let app = build_router(app_state);

    tracing::info!("easypim-dispatch listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
