//! Recurring-job scheduler: the daemon-mode replacement for host-platform
//! cron hooks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::{drafts, sync_cmd, AppContext};

/// Starts the scheduler and parks until ctrl-c / SIGTERM.
pub(crate) async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    // The handle must stay alive for the lifetime of the process — dropping
    // it shuts down all jobs.
    let _scheduler = build_scheduler(ctx).await?;

    println!("Scheduler running: nightly full sync at 02:00, draft check at 07:30");
    shutdown_signal().await;
    println!("Scheduler stopped");
    Ok(())
}

async fn build_scheduler(ctx: &AppContext) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_full_sync_job(&scheduler, ctx).await?;
    register_draft_check_job(&scheduler, ctx).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the nightly full synchronization (02:00 local).
///
/// The full sweep is the only mode that may draft missing entries, so it is
/// the one that runs unattended every night.
async fn register_full_sync_job(
    scheduler: &JobScheduler,
    ctx: &AppContext,
) -> Result<(), JobSchedulerError> {
    let config = Arc::clone(&ctx.config);
    let pool = ctx.pool.clone();

    let job = Job::new_async("0 0 2 * * *", move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let pool = pool.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting nightly full sync");
            let ctx = AppContext { config, pool };
            match sync_cmd::run_full_once(&ctx, "cron").await {
                Ok(report) => tracing::info!(
                    items = report.items_processed,
                    synced = report.groups_synced,
                    failed = report.groups_failed,
                    swept = report.swept,
                    "scheduler: nightly full sync complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: nightly full sync failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the morning stale-draft scan (07:30 local).
async fn register_draft_check_job(
    scheduler: &JobScheduler,
    ctx: &AppContext,
) -> Result<(), JobSchedulerError> {
    let config = Arc::clone(&ctx.config);
    let pool = ctx.pool.clone();

    let job = Job::new_async("0 30 7 * * *", move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let pool = pool.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting stale-draft scan");
            let ctx = AppContext { config, pool };
            match drafts::check_once(&ctx).await {
                Ok(drafts) => tracing::info!(
                    count = drafts.len(),
                    "scheduler: stale-draft scan complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: stale-draft scan failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
