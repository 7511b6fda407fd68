//! Outbound notifications: webhook-backed when configured, log-only otherwise.
//!
//! Messages are mail-shaped (subject + body) so the receiving side can relay
//! them to the support inbox unchanged.

use async_trait::async_trait;
use std::time::Duration;

use colibri_core::StaleDraft;
use colibri_engine::Notifier;

/// CLI-side notifier. Failure reports from the engine and housekeeping
/// reports both funnel through [`send`](Self::send).
pub(crate) enum CliNotifier {
    Webhook(WebhookNotifier),
    LogOnly,
}

impl CliNotifier {
    /// Builds the notifier from configuration: webhook when a URL is set,
    /// log-only otherwise.
    pub(crate) fn from_config(config: &colibri_core::AppConfig) -> Self {
        match &config.notify_webhook_url {
            Some(url) => match WebhookNotifier::new(url) {
                Ok(webhook) => CliNotifier::Webhook(webhook),
                Err(e) => {
                    tracing::error!(error = %e, "invalid notification webhook — falling back to log");
                    CliNotifier::LogOnly
                }
            },
            None => CliNotifier::LogOnly,
        }
    }

    /// Delivers a subject/body message; delivery failures are logged only.
    pub(crate) async fn send(&self, subject: &str, body: &str) {
        match self {
            CliNotifier::Webhook(webhook) => webhook.send(subject, body).await,
            CliNotifier::LogOnly => {
                tracing::warn!(subject, body, "notification (no webhook configured)");
            }
        }
    }

    /// Sends the stale-draft housekeeping report. Nothing is sent for an
    /// empty list.
    pub(crate) async fn send_stale_draft_report(&self, drafts: &[StaleDraft]) {
        if drafts.is_empty() {
            return;
        }
        let listing = drafts
            .iter()
            .map(|d| format!("{} — {}", d.sku, d.name))
            .collect::<Vec<_>>()
            .join("\n");
        let body = format!(
            "The following products are in draft without a principal image:\n\n{listing}\n"
        );
        self.send("Draft products without image", &body).await;
    }
}

#[async_trait]
impl Notifier for CliNotifier {
    async fn notify_failure(&self, context: &str, detail: &str) {
        let body = format!(
            "A product synchronization failure occurred.\n\nContext: {context}\nDetail: {detail}\n"
        );
        self.send("Product synchronization failure", &body).await;
    }
}

/// Posts `{subject, body}` JSON to a webhook with a short timeout.
pub(crate) struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    fn new(url: &str) -> Result<Self, anyhow::Error> {
        reqwest::Url::parse(url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    async fn send(&self, subject: &str, body: &str) {
        let payload = serde_json::json!({ "subject": subject, "body": body });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(subject, "notification delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    subject,
                    status = response.status().as_u16(),
                    "notification webhook rejected the message"
                );
            }
            Err(e) => {
                tracing::warn!(subject, error = %e, "notification webhook unreachable");
            }
        }
    }
}
