//! Route definitions

use axum::routing::{get, post};
use axum::Router;

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/regions", get(handlers::regions::list_regions))
        .route("/forecast", post(handlers::forecast::forecast))
        .with_state(state)
}
