//! Targeted price/stock refresh for a single catalog entry.

use clap::Subcommand;

use colibri_catalog::PgCatalog;
use colibri_engine::SyncEngine;

use crate::notify::CliNotifier;
use crate::sync_cmd::build_feed_client;
use crate::AppContext;

#[derive(Debug, Subcommand)]
pub enum StockCommands {
    /// Fetch current price and stock for one SKU from the feed's detail
    /// endpoint and update the catalog entry in place
    Refresh {
        #[arg(long)]
        sku: String,
    },
}

pub(crate) async fn handle(ctx: &AppContext, command: StockCommands) -> anyhow::Result<()> {
    match command {
        StockCommands::Refresh { sku } => {
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

            let update = engine.refresh_price_and_stock(&sku).await?;
            println!(
                "Refreshed {sku}: price {}, sale {}, stock {}",
                update.regular_price,
                update
                    .sale_price
                    .map_or_else(|| "none".to_owned(), |p| p.to_string()),
                update.stock_quantity
            );
            Ok(())
        }
    }
}
