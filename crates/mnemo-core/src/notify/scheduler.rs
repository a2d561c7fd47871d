//! Periodic due-card reminders.
//!
//! Uses tokio-cron-scheduler to check for due cards at a fixed interval and
//! post one reminder per card. Delivery problems are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, info, warn};

use super::settings::SharedWebhookSettings;
use super::webhook::{WebhookDelivery, WebhookMessage};
use crate::config::NotifierConfig;
use crate::error::{MnemoError, MnemoResult};
use crate::traits::CardStore;
use crate::types::Card;

/// Counts from one notification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub due: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Shared state of one pass, cloned into the scheduled job.
#[derive(Clone)]
struct NotifyTask {
    store: Arc<dyn CardStore>,
    settings: SharedWebhookSettings,
    delivery: WebhookDelivery,
    review_url: String,
}

impl NotifyTask {
    async fn run(&self) -> NotifyReport {
        let settings = self.settings.read().await.clone();
        if !settings.is_configured() {
            debug!("No webhook configured, skipping reminders");
            return NotifyReport::default();
        }

        let due_cards = match self.store.get_due_cards(Utc::now()) {
            Ok(cards) => cards,
            Err(e) => {
                warn!(error = %e, "Could not load due cards for reminders");
                return NotifyReport::default();
            }
        };

        let mut report = NotifyReport {
            due: due_cards.len(),
            ..Default::default()
        };

        let sends = due_cards.iter().map(|card| {
            let message = reminder_message(card, &self.review_url);
            let settings = &settings;
            async move {
                let result = self.delivery.deliver(settings, &message).await;
                if let Err(e) = &result {
                    warn!(card_id = %card.id, error = %e, "Reminder delivery failed");
                }
                result.is_ok()
            }
        });

        for ok in futures::future::join_all(sends).await {
            if ok {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

/// Reminder text for one card.
pub fn reminder_message(card: &Card, review_url: &str) -> WebhookMessage {
    WebhookMessage {
        content: format!(
            "🕒 **Review reminder** 🕒\n\
             - Card ID: `{}`\n\
             - Concept: **{}**\n\
             - Current stage: {}\n\
             - Review it now!\n\
             - {}",
            card.id, card.concept, card.stage, review_url
        ),
    }
}

/// Background job that announces due cards on the configured webhook.
pub struct DueCardNotifier {
    scheduler: JobScheduler,
    task: NotifyTask,
    config: NotifierConfig,
}

impl DueCardNotifier {
    /// Create a notifier. Call `start()` to begin periodic execution.
    pub async fn new(
        store: Arc<dyn CardStore>,
        settings: SharedWebhookSettings,
        config: NotifierConfig,
    ) -> MnemoResult<Self> {
        let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;
        let delivery = WebhookDelivery::new(Duration::from_secs(config.timeout_secs.max(1)))?;

        Ok(Self {
            scheduler,
            task: NotifyTask {
                store,
                settings,
                delivery,
                review_url: config.review_url.clone(),
            },
            config,
        })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Start the periodic job, optionally running one pass first.
    pub async fn start(&self) -> MnemoResult<()> {
        let task = self.task.clone();
        let interval = Duration::from_secs(self.config.interval_secs.max(1));

        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                let report = task.run().await;
                if report.due > 0 {
                    info!(
                        due = report.due,
                        delivered = report.delivered,
                        failed = report.failed,
                        "Sent due-card reminders"
                    );
                }
            })
        })
        .map_err(scheduler_error)?;

        self.scheduler.add(job).await.map_err(scheduler_error)?;

        if self.config.run_on_start {
            debug!("Running initial reminder pass on start");
            self.task.run().await;
        }

        self.scheduler.start().await.map_err(scheduler_error)?;

        info!(
            interval_secs = self.config.interval_secs,
            "Due-card notifier started"
        );
        Ok(())
    }

    /// Stop the scheduler gracefully.
    pub async fn shutdown(&mut self) -> MnemoResult<()> {
        info!("Shutting down due-card notifier");
        self.scheduler.shutdown().await.map_err(scheduler_error)
    }

    /// Run one pass immediately.
    pub async fn run_now(&self) -> NotifyReport {
        self.task.run().await
    }
}

fn scheduler_error(err: JobSchedulerError) -> MnemoError {
    MnemoError::internal(format!("Scheduler error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::settings::WebhookSettings;
    use crate::storage::MemoryCardStore;
    use crate::types::CardType;
    use chrono::Duration as ChronoDuration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::RwLock;

    fn store_with(cards: &[Card]) -> Arc<dyn CardStore> {
        let store = MemoryCardStore::new();
        for card in cards {
            store.save_card(card).unwrap();
        }
        Arc::new(store)
    }

    fn due_card(concept: &str) -> Card {
        let mut card = Card::new(concept, "answer", CardType::Word);
        card.update_next_review(Utc::now() - ChronoDuration::minutes(1));
        card
    }

    fn settings(url: &str) -> SharedWebhookSettings {
        Arc::new(RwLock::new(WebhookSettings::new(url)))
    }

    /// Accepts `n` HTTP requests, answers 204 and returns the raw requests.
    async fn capture_requests(n: usize) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for _ in 0..n {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    let read = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..read]);
                    let text = String::from_utf8_lossy(&buf).to_string();
                    if let Some(header_end) = text.find("\r\n\r\n") {
                        let length = text
                            .lines()
                            .find_map(|l| {
                                l.to_lowercase()
                                    .strip_prefix("content-length:")
                                    .map(|v| v.trim().parse::<usize>().unwrap())
                            })
                            .unwrap_or(0);
                        if buf.len() >= header_end + 4 + length {
                            break;
                        }
                    }
                    if read == 0 {
                        break;
                    }
                }
                socket
                    .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                requests.push(String::from_utf8_lossy(&buf).to_string());
            }
            requests
        });
        (url, handle)
    }

    #[test]
    fn test_reminder_message() {
        let card = due_card("apple");
        let message = reminder_message(&card, "http://localhost:3000/review");
        assert!(message.content.contains(&card.id));
        assert!(message.content.contains("**apple**"));
        assert!(message.content.contains("Current stage: 1"));
        assert!(message.content.ends_with("http://localhost:3000/review"));
    }

    #[tokio::test]
    async fn test_no_url_is_noop() {
        let notifier = DueCardNotifier::new(
            store_with(&[due_card("a")]),
            settings(""),
            NotifierConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(notifier.run_now().await, NotifyReport::default());
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_raised() {
        let notifier = DueCardNotifier::new(
            store_with(&[due_card("a"), due_card("b")]),
            settings("http://127.0.0.1:9/hook"),
            NotifierConfig {
                timeout_secs: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let report = notifier.run_now().await;
        assert_eq!(report.due, 2);
        assert_eq!(report.delivered, 0);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_posts_one_signed_message_per_due_card() {
        let (url, server) = capture_requests(1).await;
        let mut not_due = Card::new("later", "x", CardType::Word);
        not_due.update_next_review(Utc::now() + ChronoDuration::days(1));

        let shared = Arc::new(RwLock::new(WebhookSettings::new(url).with_secret("s3cret")));
        let notifier = DueCardNotifier::new(
            store_with(&[due_card("apple"), not_due]),
            shared,
            NotifierConfig::default(),
        )
        .await
        .unwrap();

        let report = notifier.run_now().await;
        assert_eq!(report.due, 1);
        assert_eq!(report.delivered, 1);

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert!(request.starts_with("POST /hook"));
        assert!(request.to_lowercase().contains("x-mnemo-signature: sha256="));
        assert!(request.contains("**apple**"));
    }
}
