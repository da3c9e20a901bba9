use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/categories", get(handlers::list_categories))
        .route("/parse", get(handlers::parse))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves the API until the listener fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> kunuz_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use kunuz_core::{Error, Result};
}
