//! Missing-item sweeper: soft-removes catalog entries that a full sync pass
//! did not confirm.

use std::collections::HashSet;

use colibri_catalog::{CatalogError, CatalogStore};

/// Drafts every live catalog entry whose SKU is absent from `confirmed`.
///
/// Only the full-sweep mode may call this — a paginated sub-batch never has
/// total visibility into what should currently exist. Idempotent: entries
/// already draft produce no further writes, so the returned count is the
/// number of entries actually transitioned.
///
/// # Errors
///
/// Returns [`CatalogError`] if the store fails; the sweep runs at run scope,
/// so a store failure here is fatal to the invocation.
pub async fn sweep_missing<S: CatalogStore + ?Sized>(
    store: &S,
    confirmed: &HashSet<String>,
) -> Result<u64, CatalogError> {
    let mut swept = 0u64;

    for sku in store.list_skus().await? {
        if confirmed.contains(&sku) {
            continue;
        }
        if store.draft_product_by_sku(&sku).await? {
            tracing::info!(sku = %sku, "drafted product missing from sync pass");
            swept += 1;
        }
    }

    Ok(swept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colibri_catalog::MemoryCatalog;
    use colibri_core::{
        CatalogProduct, PricePair, ProductKind, ProductStatus,
    };

    fn product(sku: &str, status: ProductStatus) -> CatalogProduct {
        CatalogProduct {
            sku: sku.to_owned(),
            kind: ProductKind::Simple,
            status,
            name: format!("Product {sku}"),
            description: String::new(),
            prices: PricePair::default(),
            manage_stock: true,
            stock_quantity: Some(1),
            low_stock_threshold: None,
            external_code: None,
            image: None,
            gallery: Vec::new(),
            category_ids: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn confirmed(skus: &[&str]) -> HashSet<String> {
        skus.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn drafts_only_unconfirmed_entries() {
        let store = MemoryCatalog::new();
        store
            .upsert_product(&product("A1", ProductStatus::Published))
            .await
            .unwrap();
        store
            .upsert_product(&product("B2", ProductStatus::Published))
            .await
            .unwrap();

        let swept = sweep_missing(&store, &confirmed(&["A1"])).await.unwrap();

        assert_eq!(swept, 1);
        assert_eq!(
            store.product("A1").unwrap().product.status,
            ProductStatus::Published
        );
        assert_eq!(
            store.product("B2").unwrap().product.status,
            ProductStatus::Draft
        );
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let store = MemoryCatalog::new();
        store
            .upsert_product(&product("A1", ProductStatus::Published))
            .await
            .unwrap();
        store
            .upsert_product(&product("B2", ProductStatus::Published))
            .await
            .unwrap();

        let set = confirmed(&["A1"]);
        let first = sweep_missing(&store, &set).await.unwrap();
        let second = sweep_missing(&store, &set).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0, "second run with the same set changes nothing");
    }

    #[tokio::test]
    async fn entries_already_draft_are_not_counted() {
        let store = MemoryCatalog::new();
        store
            .upsert_product(&product("C3", ProductStatus::Draft))
            .await
            .unwrap();

        let swept = sweep_missing(&store, &confirmed(&[])).await.unwrap();
        assert_eq!(swept, 0);
    }
}
