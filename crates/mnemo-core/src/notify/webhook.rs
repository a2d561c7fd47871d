//! Single-shot webhook delivery with optional HMAC signature.
//!
//! There is no retry: a reminder that fails to send is dropped and the next
//! scheduler tick will announce the card again while it stays due.

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;

use super::settings::WebhookSettings;
use crate::error::{MnemoError, MnemoResult};

/// Header carrying `sha256=<hex>` when a secret is configured.
pub const SIGNATURE_HEADER: &str = "X-Mnemo-Signature";

/// Error type for webhook delivery
#[derive(Debug, Clone)]
pub enum WebhookError {
    /// Request never got a response.
    Network(String),
    /// Endpoint answered with a non-success status.
    Rejected(String),
    /// Payload or settings problem.
    Config(String),
}

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Rejected(msg) => write!(f, "Rejected: {}", msg),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for WebhookError {}

/// Discord-compatible message body.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    pub content: String,
}

/// Posts messages to the configured webhook.
#[derive(Clone)]
pub struct WebhookDelivery {
    client: Client,
}

impl WebhookDelivery {
    pub fn new(timeout: Duration) -> MnemoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MnemoError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Post one message. Unconfigured settings are a successful no-op.
    pub async fn deliver(
        &self,
        settings: &WebhookSettings,
        message: &WebhookMessage,
    ) -> Result<(), WebhookError> {
        if !settings.is_configured() {
            return Ok(());
        }

        let payload = serde_json::to_string(message)
            .map_err(|e| WebhookError::Config(format!("Serialization error: {}", e)))?;

        let mut request = self
            .client
            .post(&settings.url)
            .header("Content-Type", "application/json");
        if let Some(signature) = settings
            .secret
            .as_deref()
            .and_then(|secret| sign_payload(secret, &payload))
        {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(WebhookError::Rejected(format!("{}: {}", status, body)))
        }
    }
}

/// Sign payload with HMAC-SHA256
pub fn sign_payload(secret: &str, payload: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    let result = mac.finalize();
    Some(format!("sha256={}", hex::encode(result.into_bytes())))
}

/// Verify a webhook signature
///
/// Used by webhook receivers to verify the payload was sent by mnemo
pub fn verify_signature(payload: &str, secret: &str, signature: &str) -> bool {
    match sign_payload(secret, payload) {
        Some(expected) => constant_time_eq(expected.as_bytes(), signature.as_bytes()),
        None => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
