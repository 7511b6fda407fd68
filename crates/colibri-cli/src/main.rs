mod daemon;
mod drafts;
mod ledger_cmd;
mod notify;
mod stock;
mod sync_cmd;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "colibri-cli")]
#[command(about = "Colibri catalog and sales synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Product synchronization runs
    Sync {
        #[command(subcommand)]
        command: sync_cmd::SyncCommands,
    },
    /// Draft housekeeping
    Drafts {
        #[command(subcommand)]
        command: drafts::DraftCommands,
    },
    /// Targeted price/stock operations
    Stock {
        #[command(subcommand)]
        command: stock::StockCommands,
    },
    /// Sales and voucher ledger utilities
    Ledger {
        #[command(subcommand)]
        command: ledger_cmd::LedgerCommands,
    },
    /// Run the recurring-job scheduler in the foreground
    Daemon,
}

/// Everything a command handler needs, constructed once at startup and
/// passed by reference — no ambient static state.
pub(crate) struct AppContext {
    pub config: Arc<colibri_core::AppConfig>,
    pub pool: PgPool,
}

impl AppContext {
    async fn init(config: Arc<colibri_core::AppConfig>) -> anyhow::Result<Self> {
        let pool_config = colibri_catalog::PoolConfig::from_app_config(&config);
        let pool = colibri_catalog::connect_pool(&config.database_url, pool_config).await?;
        colibri_catalog::run_migrations(&pool).await?;
        Ok(Self { config, pool })
    }
}

/// Close a run row as failed, logging rather than propagating bookkeeping
/// errors — the original failure is the one worth surfacing.
pub(crate) async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: &str) {
    if let Err(e) = colibri_catalog::runs::fail_sync_run(pool, run_id, message).await {
        tracing::error!(run_id, error = %e, "failed to record run failure");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(colibri_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync { command } => {
            let ctx = AppContext::init(config).await?;
            sync_cmd::handle(&ctx, command).await
        }
        Commands::Drafts { command } => {
            let ctx = AppContext::init(config).await?;
            drafts::handle(&ctx, command).await
        }
        Commands::Stock { command } => {
            let ctx = AppContext::init(config).await?;
            stock::handle(&ctx, command).await
        }
        Commands::Ledger { command } => ledger_cmd::handle(&config, command).await,
        Commands::Daemon => {
            let ctx = AppContext::init(config).await?;
            daemon::run(&ctx).await
        }
    }
}
