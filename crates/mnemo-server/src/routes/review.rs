//! Review endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mnemo_core::types::ReviewOutcome;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for a review.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub user_answer: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    /// Set on the second attempt after `retry_allowed`.
    #[serde(default)]
    pub retry: bool,
}

/// Evaluate an answer and apply the stage transition.
/// Reviews of the same card are serialized.
/// POST /cards/:id/review
pub async fn review_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Query(query): Query<ReviewQuery>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<ReviewOutcome>> {
    let _card_guard = state.review_locks.lock(&card_id).await;
    let outcome = state
        .review
        .process_review(&card_id, &request.user_answer, query.retry)
        .await?;
    Ok(Json(outcome))
}
