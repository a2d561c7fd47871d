//! Route definitions for the REST API.

mod cards;
mod health;
mod review;
mod settings;
mod stats;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Card operations
        .route("/cards", post(cards::create_card).get(cards::list_cards))
        .route("/cards/due", get(cards::due_cards))
        .route(
            "/cards/:id",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .route("/cards/:id/hint", get(cards::get_hint))
        // Reviews
        .route("/cards/:id/review", post(review::review_card))
        // Stats
        .route("/stats", get(stats::get_stats))
        // Reminder webhook
        .route(
            "/settings/webhook",
            get(settings::get_webhook).post(settings::set_webhook),
        )
        .route("/settings/webhook/reload", post(settings::reload_webhook))
        .with_state(state)
}

pub use cards::*;
pub use health::*;
pub use review::*;
pub use settings::*;
pub use stats::*;
