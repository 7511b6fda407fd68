//! Pre-checkout stock verification against the ledger.

use crate::client::LedgerClient;

/// One cart line to verify.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub sku: String,
    pub name: String,
    pub quantity: u32,
}

/// A cart line the ledger cannot cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    pub sku: String,
    pub name: String,
    pub requested: u32,
    pub available: i64,
}

/// Verifies every cart line against the ledger's live stock.
///
/// A lookup failure counts as zero available stock — checkout must not
/// proceed on unverifiable inventory. Returns the shortages; an empty list
/// means the checkout may continue.
pub async fn verify_cart_stock(
    client: &LedgerClient,
    lines: &[CartLine],
) -> Vec<StockShortage> {
    let mut shortages = Vec::new();

    for line in lines {
        let available = match client.check_stock(&line.sku).await {
            Ok(stock) => stock,
            Err(e) => {
                tracing::error!(sku = %line.sku, error = %e, "stock check failed — assuming none");
                0
            }
        };

        if available < i64::from(line.quantity) {
            shortages.push(StockShortage {
                sku: line.sku.clone(),
                name: line.name.clone(),
                requested: line.quantity,
                available,
            });
        }
    }

    shortages
}
