//! Operator utilities for the sales/voucher ledger.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;

use colibri_ledger::{register_sale, GiftCardLedger, LedgerClient, Order};

/// Ledger audit user recorded on CLI-triggered voucher mutations.
const LEDGER_USER: &str = "colibri-cli";

#[derive(Debug, Subcommand)]
pub enum LedgerCommands {
    /// Map an exported order JSON file to a sale and post it to the ledger
    RecordSale {
        /// Path to the order export (JSON)
        #[arg(long)]
        file: PathBuf,
    },
    /// Query the state of a gift-card voucher by its code
    VoucherStatus {
        #[arg(long)]
        code: String,
    },
    /// Push a gift card's balance-derived state to the ledger
    VoucherSync {
        #[arg(long)]
        code: String,
        /// Remaining balance; zero or less deactivates the voucher
        #[arg(long)]
        balance: rust_decimal::Decimal,
    },
}

fn build_ledger_client(config: &colibri_core::AppConfig) -> anyhow::Result<LedgerClient> {
    LedgerClient::new(&config.ledger_base_url, config.ledger_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build ledger client: {e}"))
}

pub(crate) async fn handle(
    config: &Arc<colibri_core::AppConfig>,
    command: LedgerCommands,
) -> anyhow::Result<()> {
    let client = build_ledger_client(config)?;

    match command {
        LedgerCommands::RecordSale { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let order: Order = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("{} is not a valid order export: {e}", file.display()))?;

            let annotation = register_sale(&client, &order).await;
            println!("{}", annotation.note);
            if !annotation.ok {
                anyhow::bail!("sale registration failed for order #{}", order.id);
            }
            Ok(())
        }
        LedgerCommands::VoucherStatus { code } => {
            match client.get_voucher(&code).await? {
                Some(voucher) => println!(
                    "Voucher {}: {}",
                    voucher.correlative,
                    if voucher.is_active() { "active" } else { "inactive" }
                ),
                None => println!("Voucher {code}: not found in ledger"),
            }
            Ok(())
        }
        LedgerCommands::VoucherSync { code, balance } => {
            let ledger = GiftCardLedger::new(&client, LEDGER_USER);
            let state = ledger.sync_balance(&code, balance).await?;
            println!("Voucher {code} set to {state:?}");
            Ok(())
        }
    }
}
