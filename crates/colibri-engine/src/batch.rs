//! Batch scheduler: drives one sync run over successive offset windows.
//!
//! The feed only tolerates small page sizes, so a logical batch of e.g. 900
//! items is fetched as ceil(900/100) = 9 page requests inside a single
//! invocation. Spreading a large catalog across many such invocations (and
//! the persistence of the continuation offset between them) is the caller's
//! concern.

use std::collections::HashSet;

use colibri_catalog::CatalogStore;
use colibri_core::PricePair;
use colibri_feed::{PriceStockUpdate, ProductFeed, RawRecord};

use crate::error::SyncError;
use crate::grouper::group_by_sku;
use crate::notify::Notifier;
use crate::reconcile::Reconciler;
use crate::sweep::sweep_missing;

/// Terminal state of one paginated sub-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The batch processed its quota; more upstream data likely remains.
    /// Schedule a continuation at `next_offset`.
    Completed { next_offset: u64 },
    /// The feed returned an empty page: no more upstream data. The caller
    /// must cease further invocations.
    Exhausted,
}

/// Result of one paginated sub-batch invocation.
#[derive(Debug)]
pub struct BatchReport {
    pub outcome: BatchOutcome,
    pub items_processed: usize,
    pub groups_synced: usize,
    pub groups_failed: usize,
}

/// Result of one full-sweep run.
#[derive(Debug)]
pub struct FullReport {
    pub items_processed: usize,
    pub groups_synced: usize,
    pub groups_failed: usize,
    /// Entries drafted by the missing-item sweeper.
    pub swept: u64,
}

#[derive(Default)]
struct GroupTally {
    synced: usize,
    failed: usize,
}

/// One synchronization engine wired to its collaborators for the duration of
/// an invocation.
pub struct SyncEngine<'a, F, S, N>
where
    F: ProductFeed + ?Sized,
    S: CatalogStore + ?Sized,
    N: Notifier + ?Sized,
{
    feed: &'a F,
    store: &'a S,
    notifier: &'a N,
    media_base_url: String,
    page_size: u32,
}

impl<'a, F, S, N> SyncEngine<'a, F, S, N>
where
    F: ProductFeed + ?Sized,
    S: CatalogStore + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        feed: &'a F,
        store: &'a S,
        notifier: &'a N,
        media_base_url: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            feed,
            store,
            notifier,
            media_base_url: media_base_url.into(),
            page_size: page_size.max(1),
        }
    }

    /// Runs one paginated sub-batch starting at `offset`.
    ///
    /// Fetches up to `ceil(batch_size / page_size)` pages, reconciling every
    /// group on each page. Stops early once `batch_size` items were
    /// processed, or immediately on an empty page (exhaustion).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on feed transport/decode failures — fatal for
    /// this invocation; the external schedule owns the retry.
    pub async fn run_batch(
        &self,
        offset: u64,
        batch_size: u32,
    ) -> Result<BatchReport, SyncError> {
        let batch_size = batch_size.max(1);
        let chunks = batch_size.div_ceil(self.page_size);
        tracing::info!(offset, batch_size, chunks, "starting sync sub-batch");

        let mut items_processed = 0usize;
        let mut tally = GroupTally::default();
        let mut confirmed = HashSet::new();

        for i in 0..chunks {
            let current_offset = offset + u64::from(i) * u64::from(self.page_size);

            let page = match self.feed.fetch_page(current_offset, self.page_size).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(offset = current_offset, error = %e, "feed fetch failed");
                    self.notifier
                        .notify_failure(
                            &format!("product sync batch at offset {current_offset}"),
                            &e.to_string(),
                        )
                        .await;
                    return Err(e.into());
                }
            };

            if page.is_empty() {
                tracing::info!(
                    offset = current_offset,
                    items_processed,
                    "feed exhausted — no more products"
                );
                return Ok(BatchReport {
                    outcome: BatchOutcome::Exhausted,
                    items_processed,
                    groups_synced: tally.synced,
                    groups_failed: tally.failed,
                });
            }

            let page_len = page.len();
            self.reconcile_records(page, &mut confirmed, &mut tally)
                .await;
            items_processed += page_len;

            if items_processed >= batch_size as usize {
                tracing::info!(items_processed, "batch quota reached — stopping early");
                break;
            }
        }

        Ok(BatchReport {
            outcome: BatchOutcome::Completed {
                next_offset: offset + u64::from(batch_size),
            },
            items_processed,
            groups_synced: tally.synced,
            groups_failed: tally.failed,
        })
    }

    /// Runs a full sweep: fetch the entire feed in one call, reconcile every
    /// group, then draft everything the pass did not confirm.
    ///
    /// Only this mode runs the missing-item sweeper — it alone has total
    /// visibility into what should currently exist.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on feed transport/decode failures or on store
    /// failures during the sweep.
    pub async fn run_full(&self) -> Result<FullReport, SyncError> {
        let records = match self.feed.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "full feed fetch failed");
                self.notifier
                    .notify_failure("full product sync", &e.to_string())
                    .await;
                return Err(e.into());
            }
        };

        let items_processed = records.len();
        tracing::info!(items_processed, "starting full sync sweep");

        let mut tally = GroupTally::default();
        let mut confirmed = HashSet::new();
        self.reconcile_records(records, &mut confirmed, &mut tally)
            .await;

        let swept = sweep_missing(self.store, &confirmed).await?;

        Ok(FullReport {
            items_processed,
            groups_synced: tally.synced,
            groups_failed: tally.failed,
            swept,
        })
    }

    /// Targeted price/stock refresh for one catalog entry, from the feed's
    /// detail endpoint. Nothing besides the price pair and stock quantity is
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownSku`] when no live entry matches `sku`,
    /// and [`SyncError::Feed`] on detail fetch failures.
    pub async fn refresh_price_and_stock(
        &self,
        sku: &str,
    ) -> Result<PriceStockUpdate, SyncError> {
        let detail = self.feed.fetch_detail(sku).await?;
        let prices = PricePair::from_feed(detail.regular_price, detail.sale_price);

        let updated = self
            .store
            .update_price_and_stock(sku, prices, detail.stock_quantity)
            .await?;
        if !updated {
            return Err(SyncError::UnknownSku(sku.to_owned()));
        }

        tracing::info!(
            sku = %sku,
            stock = detail.stock_quantity,
            "price and stock refreshed"
        );
        Ok(detail)
    }

    /// Groups a page of records and reconciles every group with per-group
    /// failure isolation: a failed group is logged, reported, drafted, and
    /// excluded from the confirmed set.
    async fn reconcile_records(
        &self,
        records: Vec<RawRecord>,
        confirmed: &mut HashSet<String>,
        tally: &mut GroupTally,
    ) {
        let reconciler = Reconciler::new(self.store, &self.media_base_url);
        let groups = group_by_sku(records);
        tracing::debug!(groups = groups.len(), "reconciling grouped records");

        for group in groups {
            match reconciler.reconcile_group(&group).await {
                Ok(()) => {
                    tally.synced += 1;
                    confirmed.insert(group.sku);
                }
                Err(e) => {
                    tally.failed += 1;
                    tracing::error!(sku = %group.sku, error = %e, "failed to reconcile group");
                    self.notifier
                        .notify_failure(
                            &format!("product sync for SKU {}", group.sku),
                            &e.to_string(),
                        )
                        .await;
                    // Can't confirm current data — don't show it for sale.
                    if let Err(draft_err) = self.store.draft_product_by_sku(&group.sku).await {
                        tracing::error!(
                            sku = %group.sku,
                            error = %draft_err,
                            "could not draft failed product"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
