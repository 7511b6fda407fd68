//! Out-of-band failure reporting.

use async_trait::async_trait;

/// Receives structured failure reports for out-of-band alerting.
///
/// Fire-and-forget: implementations must swallow their own delivery failures
/// (logging them at most) and must never block the run beyond a bounded
/// send.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_failure(&self, context: &str, detail: &str);
}

/// Notifier that only writes to the log. Used when no webhook is configured
/// and as the default for scheduled runs in development.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_failure(&self, context: &str, detail: &str) {
        tracing::error!(context, detail, "sync failure reported");
    }
}
