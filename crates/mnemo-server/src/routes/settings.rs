//! Reminder webhook settings endpoints.

use axum::{extract::State, Json};
use mnemo_core::notify::WebhookSettings;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

/// Public view of the webhook settings. The signing secret is never returned.
#[derive(Debug, Serialize)]
pub struct WebhookView {
    pub discord_webhook_url: String,
    pub configured: bool,
}

impl From<WebhookSettings> for WebhookView {
    fn from(settings: WebhookSettings) -> Self {
        Self {
            configured: settings.is_configured(),
            discord_webhook_url: settings.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetWebhookRequest {
    #[serde(alias = "url")]
    pub discord_webhook_url: String,
}

/// GET /settings/webhook
pub async fn get_webhook(State(state): State<AppState>) -> Json<WebhookView> {
    Json(state.webhook.current().await.into())
}

/// Replace (or clear, with an empty string) the webhook URL.
/// POST /settings/webhook
pub async fn set_webhook(
    State(state): State<AppState>,
    Json(request): Json<SetWebhookRequest>,
) -> ApiResult<Json<WebhookView>> {
    let settings = state.webhook.set_url(&request.discord_webhook_url).await?;
    Ok(Json(settings.into()))
}

/// POST /settings/webhook/reload
pub async fn reload_webhook(State(state): State<AppState>) -> ApiResult<Json<WebhookView>> {
    let settings = state.webhook.reload().await?;
    Ok(Json(settings.into()))
}
