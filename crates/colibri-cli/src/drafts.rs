//! Draft housekeeping: the read-only stale-draft scan.

use clap::Subcommand;

use colibri_catalog::{CatalogStore, PgCatalog};
use colibri_core::StaleDraft;

use crate::notify::CliNotifier;
use crate::AppContext;

#[derive(Debug, Subcommand)]
pub enum DraftCommands {
    /// Scan for draft products lacking a principal image and forward the
    /// list to the notification sink
    Check,
}

pub(crate) async fn handle(ctx: &AppContext, command: DraftCommands) -> anyhow::Result<()> {
    match command {
        DraftCommands::Check => {
            let drafts = check_once(ctx).await?;
            if drafts.is_empty() {
                println!("No draft products without an image");
            } else {
                println!("{} draft product(s) without an image reported", drafts.len());
            }
            Ok(())
        }
    }
}

/// The scan itself, shared with the daemon's morning job. Read-only: the
/// report goes out of band, the catalog is not touched.
pub(crate) async fn check_once(ctx: &AppContext) -> anyhow::Result<Vec<StaleDraft>> {
    let store = PgCatalog::new(ctx.pool.clone());
    let drafts = store.list_stale_drafts().await?;

    tracing::info!(count = drafts.len(), "stale-draft scan finished");
    let notifier = CliNotifier::from_config(&ctx.config);
    notifier.send_stale_draft_report(&drafts).await;

    Ok(drafts)
}
