//! Synchronization command handlers.
//!
//! A "batch" is one scheduled invocation: up to `COLIBRI_SYNC_BATCH_SIZE`
//! items fetched in page-size chunks. `start` chains batches until the feed
//! is exhausted; `batch` runs exactly one and leaves the continuation offset
//! behind for the next invocation.

use clap::Subcommand;

use colibri_catalog::{runs, MemoryCatalog, PgCatalog};
use colibri_engine::{BatchOutcome, BatchReport, FullReport, LogNotifier, SyncEngine};
use colibri_feed::ColibriClient;

use crate::notify::CliNotifier;
use crate::{fail_run_best_effort, AppContext};

#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Start a batched synchronization and chain sub-batches until the feed
    /// is exhausted
    Start {
        /// Override the configured starting offset
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Run exactly one sub-batch, resuming from the persisted offset
    Batch {
        /// Override the persisted/configured offset
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Full sweep: fetch the whole feed, reconcile everything, then draft
    /// entries missing from the pass
    Full {
        /// Reconcile against an in-memory catalog and report without writing
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) fn build_feed_client(
    config: &colibri_core::AppConfig,
) -> anyhow::Result<ColibriClient> {
    ColibriClient::new(
        &config.feed_base_url,
        config.feed_timeout_secs,
        config.feed_max_retries,
        config.feed_retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build feed client: {e}"))
}

pub(crate) async fn handle(ctx: &AppContext, command: SyncCommands) -> anyhow::Result<()> {
    match command {
        SyncCommands::Start { offset } => {
            let start_offset = offset.unwrap_or(ctx.config.sync_start_offset);
            start_chained(ctx, start_offset).await
        }
        SyncCommands::Batch { offset } => {
            let start_offset = match offset {
                Some(offset) => offset,
                None => resume_offset(ctx).await?,
            };
            let report = run_one_batch(ctx, start_offset, "cli").await?;
            print_batch_banner(start_offset, &report);
            Ok(())
        }
        SyncCommands::Full { dry_run } => {
            if dry_run {
                let report = run_full_dry(ctx).await?;
                println!(
                    "[dry-run] {} items in {} groups would sync ({} failing); nothing written",
                    report.items_processed,
                    report.groups_synced + report.groups_failed,
                    report.groups_failed
                );
            } else {
                let report = run_full_once(ctx, "cli").await?;
                println!(
                    "Full sync finished: {} items, {} groups synced, {} failed, {} drafted as missing",
                    report.items_processed,
                    report.groups_synced,
                    report.groups_failed,
                    report.swept
                );
            }
            Ok(())
        }
    }
}

/// Offset a standalone `sync batch` resumes from: the persisted continuation
/// when one exists, the configured start otherwise.
async fn resume_offset(ctx: &AppContext) -> anyhow::Result<u64> {
    let persisted = runs::get_next_offset(&ctx.pool).await?;
    Ok(persisted
        .and_then(|offset| u64::try_from(offset).ok())
        .unwrap_or(ctx.config.sync_start_offset))
}

/// Chain sub-batches from `start_offset` until the feed reports exhaustion.
async fn start_chained(ctx: &AppContext, start_offset: u64) -> anyhow::Result<()> {
    let mut offset = start_offset;
    let mut total_items = 0usize;
    let mut batches = 0u32;

    println!("Starting batched synchronization at offset {offset}");
    loop {
        let report = run_one_batch(ctx, offset, "cli").await?;
        total_items += report.items_processed;
        batches += 1;
        print_batch_banner(offset, &report);

        match report.outcome {
            BatchOutcome::Completed { next_offset } => offset = next_offset,
            BatchOutcome::Exhausted => break,
        }
    }

    println!("Synchronization finished: {total_items} items across {batches} sub-batches");
    Ok(())
}

/// One sub-batch with run bookkeeping: a `sync_runs` row brackets the batch
/// and the continuation offset is persisted (or cleared on exhaustion).
pub(crate) async fn run_one_batch(
    ctx: &AppContext,
    offset: u64,
    trigger: &str,
) -> anyhow::Result<BatchReport> {
    let feed = build_feed_client(&ctx.config)?;
    let store = PgCatalog::new(ctx.pool.clone());
    let notifier = CliNotifier::from_config(&ctx.config);
    let engine = SyncEngine::new(
        &feed,
        &store,
        &notifier,
        ctx.config.media_base_url.clone(),
        ctx.config.feed_page_size,
    );

    let run = runs::create_sync_run(&ctx.pool, "batch", trigger).await?;

    match engine.run_batch(offset, ctx.config.sync_batch_size).await {
        Ok(report) => {
            let outcome = match report.outcome {
                BatchOutcome::Completed { .. } => "completed",
                BatchOutcome::Exhausted => "exhausted",
            };
            let items = i32::try_from(report.items_processed).unwrap_or(i32::MAX);
            runs::complete_sync_run(&ctx.pool, run.id, items, outcome).await?;

            let next = match report.outcome {
                BatchOutcome::Completed { next_offset } => {
                    Some(i64::try_from(next_offset).unwrap_or(i64::MAX))
                }
                BatchOutcome::Exhausted => None,
            };
            runs::set_next_offset(&ctx.pool, next).await?;

            Ok(report)
        }
        Err(e) => {
            fail_run_best_effort(&ctx.pool, run.id, &format!("{e:#}")).await;
            Err(e.into())
        }
    }
}

/// One full sweep with run bookkeeping. Shared by the CLI command and the
/// daemon's nightly job.
pub(crate) async fn run_full_once(ctx: &AppContext, trigger: &str) -> anyhow::Result<FullReport> {
    let feed = build_feed_client(&ctx.config)?;
    let store = PgCatalog::new(ctx.pool.clone());
    let notifier = CliNotifier::from_config(&ctx.config);
    let engine = SyncEngine::new(
        &feed,
        &store,
        &notifier,
        ctx.config.media_base_url.clone(),
        ctx.config.feed_page_size,
    );

    let run = runs::create_sync_run(&ctx.pool, "full", trigger).await?;

    match engine.run_full().await {
        Ok(report) => {
            let items = i32::try_from(report.items_processed).unwrap_or(i32::MAX);
            runs::complete_sync_run(&ctx.pool, run.id, items, "completed").await?;
            Ok(report)
        }
        Err(e) => {
            fail_run_best_effort(&ctx.pool, run.id, &format!("{e:#}")).await;
            Err(e.into())
        }
    }
}

/// A full sweep against an empty in-memory catalog: classifies and counts
/// without touching the database. Failures stay in the log; a dry run must
/// not page anyone.
async fn run_full_dry(ctx: &AppContext) -> anyhow::Result<FullReport> {
    let feed = build_feed_client(&ctx.config)?;
    let store = MemoryCatalog::new();
    let notifier = LogNotifier;
    let engine = SyncEngine::new(
        &feed,
        &store,
        &notifier,
        ctx.config.media_base_url.clone(),
        ctx.config.feed_page_size,
    );
    Ok(engine.run_full().await?)
}

fn print_batch_banner(offset: u64, report: &BatchReport) {
    match report.outcome {
        BatchOutcome::Completed { next_offset } => println!(
            "Sub-batch at offset {offset}: {} items, {} groups synced, {} failed; continue at {next_offset}",
            report.items_processed, report.groups_synced, report.groups_failed
        ),
        BatchOutcome::Exhausted => println!(
            "Sub-batch at offset {offset}: {} items, {} groups synced, {} failed; feed exhausted",
            report.items_processed, report.groups_synced, report.groups_failed
        ),
    }
}
