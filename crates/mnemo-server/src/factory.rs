//! Build the application state and notifier from configuration.

use std::sync::Arc;

use mnemo_core::config::MnemoConfig;
use mnemo_core::error::MnemoResult;
use mnemo_core::notify::{DueCardNotifier, WebhookSettingsStore};
use mnemo_core::storage::open_store;
use mnemo_core::traits::ReviewOracle;
use mnemo_core::LlmOracle;
use mnemo_embeddings::EmbedderFactory;
use mnemo_llm::LlmFactory;
use tracing::info;

use crate::state::AppState;

/// Create the provider-backed state described by `config`.
pub fn create_state(config: MnemoConfig) -> MnemoResult<AppState> {
    let llm = LlmFactory::from_config(&config.llm)?;
    let embedder = EmbedderFactory::from_config(&config.embedder)?;
    let oracle: Arc<dyn ReviewOracle> = Arc::new(LlmOracle::new(llm, embedder));

    let store = open_store(&config.storage)?;
    let webhook = WebhookSettingsStore::open(&config.notifier.webhook_settings_path)?;

    info!(
        storage = ?config.storage.backend,
        llm = ?config.llm.provider,
        embedder = ?config.embedder.provider,
        "Application state ready"
    );

    Ok(AppState::new(config, store, oracle, webhook))
}

/// Create the due-card notifier sharing the state's store and webhook settings.
pub async fn create_notifier(state: &AppState) -> MnemoResult<DueCardNotifier> {
    DueCardNotifier::new(
        state.store(),
        state.webhook.handle(),
        state.config.notifier.clone(),
    )
    .await
}
