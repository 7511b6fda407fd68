pub mod client;
pub mod error;
pub mod record;
mod retry;

use async_trait::async_trait;

pub use client::ColibriClient;
pub use error::FeedError;
pub use record::{PriceStockUpdate, RawRecord};

/// Read side of the Colibri product feed, as consumed by the sync engine.
///
/// An empty page from [`fetch_page`](ProductFeed::fetch_page) signals
/// exhaustion — there is no more upstream data at or beyond that offset.
#[async_trait]
pub trait ProductFeed: Send + Sync {
    /// Fetches one page of raw product records.
    async fn fetch_page(&self, offset: u64, limit: u32) -> Result<Vec<RawRecord>, FeedError>;

    /// Fetches the entire feed in a single call (full-sweep mode).
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FeedError>;

    /// Fetches current price and stock for one variation-level unique code.
    async fn fetch_detail(&self, unique_code: &str) -> Result<PriceStockUpdate, FeedError>;
}
