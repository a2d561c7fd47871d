//! Due-card notifications over a webhook.

mod scheduler;
mod settings;
mod webhook;

pub use scheduler::{reminder_message, DueCardNotifier, NotifyReport};
pub use settings::{SharedWebhookSettings, WebhookSettings, WebhookSettingsStore};
pub use webhook::{
    sign_payload, verify_signature, WebhookDelivery, WebhookError, WebhookMessage, SIGNATURE_HEADER,
};
