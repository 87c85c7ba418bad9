//! Region catalog handler

use axum::extract::State;
use axum::Json;

use crate::regions::Region;
use crate::state::AppState;

/// GET /regions
pub async fn list_regions(State(state): State<AppState>) -> Json<Vec<Region>> {
    Json(state.regions.as_ref().clone())
}
