use thiserror::Error;

use colibri_catalog::CatalogError;
use colibri_feed::FeedError;

/// A failure scoped to one SKU group or one variation.
///
/// Item errors never escape their loop iteration: the run loop drafts the
/// affected entity, reports the failure, and continues with the next item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("record has no variation-level unique code")]
    MissingUniqueCode,

    #[error("catalog store failure: {0}")]
    Catalog(#[from] CatalogError),
}

/// A failure fatal to the current run.
///
/// Transport and decode failures from the feed, and store failures outside
/// any single item's scope, terminate the invocation; the external scheduler
/// decides whether and when to retry.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("catalog store failure: {0}")]
    Catalog(#[from] CatalogError),

    #[error("no live catalog entry with SKU {0}")]
    UnknownSku(String),
}
