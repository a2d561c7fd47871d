//! Stats endpoint.

use axum::{extract::State, Json};
use mnemo_core::types::Stats;

use crate::error::ApiResult;
use crate::state::AppState;

/// Summary over all cards.
/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.cards.get_stats()?))
}
