//! Card CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use mnemo_core::types::{Card, CardType, Stage};
use mnemo_core::validation::CardValidator;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Card as returned by the API. History is summarized as a success rate.
#[derive(Debug, Serialize)]
pub struct CardView {
    pub card_id: String,
    pub concept: String,
    pub answer: String,
    pub card_type: CardType,
    pub stage: Stage,
    pub next_review: DateTime<Utc>,
    pub success_rate: f64,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        let success_rate = card.success_rate();
        Self {
            card_id: card.id,
            concept: card.concept,
            answer: card.answer,
            card_type: card.card_type,
            stage: card.stage,
            next_review: card.next_review,
            success_rate,
        }
    }
}

/// Due card as shown before answering. The answer is replaced by its masked hint.
#[derive(Debug, Serialize)]
pub struct DueCardView {
    pub card_id: String,
    pub concept: String,
    pub card_type: CardType,
    pub stage: Stage,
    pub next_review: DateTime<Utc>,
    pub hint: String,
}

impl From<Card> for DueCardView {
    fn from(card: Card) -> Self {
        let hint = card.masked_hint();
        Self {
            card_id: card.id,
            concept: card.concept,
            card_type: card.card_type,
            stage: card.stage,
            next_review: card.next_review,
            hint,
        }
    }
}

fn default_card_type() -> String {
    CardType::Word.to_string()
}

/// Request body for creating or replacing a card.
#[derive(Debug, Deserialize)]
pub struct CardRequest {
    pub concept: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default = "default_card_type")]
    pub card_type: String,
}

/// Create a card. A concept card without an answer gets a generated definition.
/// POST /cards
pub async fn create_card(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> ApiResult<(StatusCode, Json<CardView>)> {
    let card_type = CardType::parse(&request.card_type)?;

    let answer = if card_type == CardType::Concept && request.answer.trim().is_empty() {
        CardValidator.validate_concept(&request.concept)?;
        debug!(concept = %request.concept, "Generating definition for concept card");
        state
            .oracle
            .generate_concept_definition(&request.concept)
            .await?
    } else {
        request.answer
    };

    let card = state.cards.create_card(&request.concept, &answer, card_type)?;
    Ok((StatusCode::CREATED, Json(card.into())))
}

/// List all cards.
/// GET /cards
pub async fn list_cards(State(state): State<AppState>) -> ApiResult<Json<Vec<CardView>>> {
    let cards = state.cards.get_all_cards()?;
    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DueQuery {
    /// Return every card regardless of schedule.
    #[serde(default)]
    pub test: bool,
}

/// Cards due for review.
/// GET /cards/due
pub async fn due_cards(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> ApiResult<Json<Vec<DueCardView>>> {
    let cards = if query.test {
        state.cards.get_all_cards()?
    } else {
        state.cards.get_due_cards()?
    };
    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

/// GET /cards/:id
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> ApiResult<Json<CardView>> {
    Ok(Json(state.cards.require_card(&card_id)?.into()))
}

#[derive(Debug, Serialize)]
pub struct HintResponse {
    pub hint: String,
}

/// Stage-gated hint from the oracle; empty where no hint applies.
/// GET /cards/:id/hint
pub async fn get_hint(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> ApiResult<Json<HintResponse>> {
    let card = state.cards.require_card(&card_id)?;
    let hint = state
        .oracle
        .generate_hint(&card.concept, &card.answer, card.stage, card.card_type)
        .await?;
    Ok(Json(HintResponse { hint }))
}

/// Replace concept, answer and type, keeping stage and history.
/// PUT /cards/:id
pub async fn update_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Json(request): Json<CardRequest>,
) -> ApiResult<Json<CardView>> {
    let card_type = CardType::parse(&request.card_type)?;
    let card = state
        .cards
        .update_card(&card_id, &request.concept, &request.answer, card_type)?;
    Ok(Json(card.into()))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub detail: String,
}

/// DELETE /cards/:id
pub async fn delete_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if state.cards.delete_card(&card_id)? {
        Ok(Json(DeleteResponse {
            detail: "Card deleted".to_string(),
        }))
    } else {
        Err(ApiError::not_found(format!(
            "Card with id '{}' not found",
            card_id
        )))
    }
}
