//! JSON HTTP surface over the two prediction pipelines.

pub mod dto;
mod error;
pub mod handlers;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;
pub use state::AppState;

/// All routes, with permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/symptoms", get(handlers::symptoms))
        .route("/predict", post(handlers::predict))
        .route("/suggest-symptoms", post(handlers::suggest_symptoms))
        .route("/emoji-suggest", post(handlers::emoji_suggest))
        .route("/emoji-suggest/naive-bayes", post(handlers::emoji_suggest))
        .route("/emoji-train", post(handlers::emoji_train))
        .route("/emoji-train/naive-bayes", post(handlers::emoji_train))
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and serves until the process exits.
pub async fn serve(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
