//! Persisted webhook target for due-card reminders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{MnemoError, MnemoResult};

/// Where reminders are posted.
///
/// Serialized as `{"discord_webhook_url": "..."}` so existing settings
/// files keep working.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    #[serde(rename = "discord_webhook_url", default)]
    pub url: String,
    /// HMAC key for the `X-Mnemo-Signature` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl WebhookSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// An empty URL disables delivery.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Shared read handle given to the notifier.
pub type SharedWebhookSettings = Arc<RwLock<WebhookSettings>>;

/// Owns the settings file and the live copy.
///
/// The live copy only changes through [`set_url`](Self::set_url) and
/// [`reload`](Self::reload).
#[derive(Debug, Clone)]
pub struct WebhookSettingsStore {
    path: PathBuf,
    current: SharedWebhookSettings,
}

impl WebhookSettingsStore {
    /// Load settings from `path`. A missing file yields empty settings.
    pub fn open(path: impl Into<PathBuf>) -> MnemoResult<Self> {
        let path = path.into();
        let settings = Self::load(&path)?;
        Ok(Self {
            path,
            current: Arc::new(RwLock::new(settings)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> SharedWebhookSettings {
        self.current.clone()
    }

    pub async fn current(&self) -> WebhookSettings {
        self.current.read().await.clone()
    }

    /// Validate, persist and swap in a new URL. An empty string clears it.
    pub async fn set_url(&self, url: &str) -> MnemoResult<WebhookSettings> {
        let url = url.trim();
        validate_url(url)?;

        let mut current = self.current.write().await;
        let updated = WebhookSettings {
            url: url.to_string(),
            secret: current.secret.clone(),
        };
        Self::persist(&self.path, &updated)?;
        *current = updated.clone();
        info!(configured = updated.is_configured(), "Webhook URL updated");
        Ok(updated)
    }

    /// Re-read the settings file and swap it in.
    pub async fn reload(&self) -> MnemoResult<WebhookSettings> {
        let loaded = Self::load(&self.path)?;
        *self.current.write().await = loaded.clone();
        info!(path = %self.path.display(), "Webhook settings reloaded");
        Ok(loaded)
    }

    fn load(path: &Path) -> MnemoResult<WebhookSettings> {
        if !path.exists() {
            return Ok(WebhookSettings::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(WebhookSettings::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            MnemoError::Configuration(format!(
                "Invalid webhook settings in {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn persist(path: &Path, settings: &WebhookSettings) -> MnemoResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }
}

fn validate_url(url: &str) -> MnemoResult<()> {
    if url.is_empty() {
        return Ok(());
    }
    let parsed = url::Url::parse(url)
        .map_err(|e| MnemoError::validation(format!("Invalid webhook URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MnemoError::validation(format!(
            "Webhook URL must use http or https, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_unconfigured() {
        let dir = tempfile::tempdir().unwrap();
        let store = WebhookSettingsStore::open(dir.path().join("webhook.json")).unwrap();
        assert!(!store.current().await.is_configured());
    }

    #[tokio::test]
    async fn test_reads_legacy_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webhook_config.json");
        std::fs::write(&path, r#"{"discord_webhook_url": "https://discord.test/api/webhooks/1"}"#)
            .unwrap();

        let store = WebhookSettingsStore::open(&path).unwrap();
        let settings = store.current().await;
        assert_eq!(settings.url, "https://discord.test/api/webhooks/1");
        assert!(settings.secret.is_none());
    }

    #[tokio::test]
    async fn test_set_url_persists_and_updates_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("webhook.json");
        let store = WebhookSettingsStore::open(&path).unwrap();
        let handle = store.handle();

        store.set_url("https://hooks.test/abc").await.unwrap();
        assert_eq!(handle.read().await.url, "https://hooks.test/abc");

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["discord_webhook_url"], "https://hooks.test/abc");
    }

    #[tokio::test]
    async fn test_set_url_rejects_bad_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = WebhookSettingsStore::open(dir.path().join("w.json")).unwrap();

        assert!(matches!(
            store.set_url("not a url").await,
            Err(MnemoError::Validation { .. })
        ));
        assert!(store.set_url("ftp://hooks.test").await.is_err());
        assert!(!store.current().await.is_configured());

        store.set_url("").await.unwrap();
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.json");
        let store = WebhookSettingsStore::open(&path).unwrap();

        std::fs::write(&path, r#"{"discord_webhook_url": "https://edited.test"}"#).unwrap();
        assert!(!store.current().await.is_configured());

        store.reload().await.unwrap();
        assert_eq!(store.current().await.url, "https://edited.test");
    }
}
