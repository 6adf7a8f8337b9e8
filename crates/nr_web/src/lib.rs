use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/info", get(handlers::info))
        .route("/api/news/search", post(handlers::search_news))
        .route("/api/news/updates", post(handlers::check_news_updates))
        .route("/api/news/content", get(handlers::story_content))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::handlers::ApiError;
    pub use crate::{create_app, AppState};
    pub use nr_core::{Error, Result};
}
