#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,

    /// Base URL of the Colibri product-feed API.
    pub feed_base_url: String,
    /// Base URL of the Colibri sales/voucher ledger API.
    pub ledger_base_url: String,
    /// Base URL under which product image files are hosted; principal images
    /// are resolved by exact match of `media_base_url + filename`.
    pub media_base_url: String,

    /// Upstream page-size ceiling. The feed rejects larger `limit` values.
    pub feed_page_size: u32,
    /// Number of items one scheduled sub-batch aims to process before
    /// yielding control back to the scheduler.
    pub sync_batch_size: u32,
    /// Offset the first sub-batch of an admin-triggered sync starts from.
    pub sync_start_offset: u64,

    pub feed_timeout_secs: u64,
    pub ledger_timeout_secs: u64,
    pub feed_max_retries: u32,
    pub feed_retry_backoff_base_secs: u64,

    /// Optional webhook that receives failure notifications. When unset,
    /// failures are only logged.
    pub notify_webhook_url: Option<String>,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("feed_base_url", &self.feed_base_url)
            .field("ledger_base_url", &self.ledger_base_url)
            .field("media_base_url", &self.media_base_url)
            .field("feed_page_size", &self.feed_page_size)
            .field("sync_batch_size", &self.sync_batch_size)
            .field("sync_start_offset", &self.sync_start_offset)
            .field("feed_timeout_secs", &self.feed_timeout_secs)
            .field("ledger_timeout_secs", &self.ledger_timeout_secs)
            .field("feed_max_retries", &self.feed_max_retries)
            .field(
                "feed_retry_backoff_base_secs",
                &self.feed_retry_backoff_base_secs,
            )
            .field("notify_webhook_url", &self.notify_webhook_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
