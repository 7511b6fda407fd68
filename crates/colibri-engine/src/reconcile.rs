//! The catalog reconciler: create-or-update state machine for one SKU group.

use std::collections::HashSet;

use rust_decimal::Decimal;

use colibri_catalog::{CatalogStore, ProductId};
use colibri_core::{
    CatalogProduct, CatalogVariation, PricePair, ProductKind, ProductStatus,
};
use colibri_feed::RawRecord;

use crate::attributes::{extract_attributes, variation_attributes};
use crate::error::ItemError;
use crate::grouper::SkuGroup;
use crate::images::{resolve_categories, resolve_gallery, resolve_principal_image};

/// Status of a simple product derived from what actually resolved.
///
/// Any one disqualifying condition forces draft; all are checked.
#[must_use]
pub fn simple_status(
    image_resolved: bool,
    regular_price: Decimal,
    stock_quantity: i32,
) -> ProductStatus {
    if !image_resolved || regular_price <= Decimal::ZERO || stock_quantity < 1 {
        ProductStatus::Draft
    } else {
        ProductStatus::Published
    }
}

/// Status of one variation: sellable iff it has a price and stock.
#[must_use]
pub fn variation_status(regular_price: Decimal, stock_quantity: i32) -> ProductStatus {
    if regular_price > Decimal::ZERO && stock_quantity > 0 {
        ProductStatus::Published
    } else {
        ProductStatus::Draft
    }
}

/// Status of a variable parent: sellable iff at least one variation is and
/// the parent resolved a principal image.
#[must_use]
pub fn parent_status(image_resolved: bool, published_variations: usize) -> ProductStatus {
    if image_resolved && published_variations > 0 {
        ProductStatus::Published
    } else {
        ProductStatus::Draft
    }
}

struct SavedVariation {
    code: String,
    status: ProductStatus,
}

/// Reconciles SKU groups against the catalog store.
pub struct Reconciler<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
    media_base_url: &'a str,
}

impl<'a, S: CatalogStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, media_base_url: &'a str) -> Self {
        Self {
            store,
            media_base_url,
        }
    }

    /// Create-or-update the catalog entry for one SKU group.
    ///
    /// The first record's type tag routes the group: `"variable"` (any case)
    /// takes the variable path, anything else the simple path.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError`] when the group as a whole cannot be saved. The
    /// caller owns the recovery policy (draft the SKU, continue the run).
    pub async fn reconcile_group(&self, group: &SkuGroup) -> Result<(), ItemError> {
        let Some(first) = group.records.first() else {
            return Ok(());
        };

        if first.is_variable() {
            self.save_variable(group).await
        } else {
            self.save_simple(&group.sku, first).await
        }
    }

    /// Looks up the SKU and trashes any existing entry of the wrong kind.
    /// Kind mismatches are never coerced in place.
    async fn clear_kind_mismatch(
        &self,
        sku: &str,
        expected: ProductKind,
    ) -> Result<(), ItemError> {
        if let Some(existing) = self.store.find_by_sku(sku).await? {
            if existing.kind != expected {
                tracing::warn!(
                    sku = %sku,
                    found = %existing.kind,
                    expected = %expected,
                    "existing entry has wrong kind — trashing and recreating"
                );
                self.store.trash_product(existing.id).await?;
            }
        }
        Ok(())
    }

    async fn save_simple(&self, sku: &str, record: &RawRecord) -> Result<(), ItemError> {
        self.clear_kind_mismatch(sku, ProductKind::Simple).await?;

        let image = resolve_principal_image(self.store, self.media_base_url, record).await?;
        let gallery = resolve_gallery(self.store, self.media_base_url, record).await?;
        let category_ids = resolve_categories(self.store, record).await;
        let attributes = extract_attributes(self.store, std::slice::from_ref(record)).await;

        let regular_price = record.regular_price();
        let stock_quantity = record.stock_quantity();
        let status = simple_status(image.is_some(), regular_price, stock_quantity);

        let product = CatalogProduct {
            sku: sku.to_owned(),
            kind: ProductKind::Simple,
            status,
            name: record.title().to_owned(),
            description: record.description().to_owned(),
            prices: PricePair::from_feed(regular_price, record.sale_price()),
            manage_stock: true,
            stock_quantity: Some(stock_quantity),
            low_stock_threshold: record.low_stock_threshold(),
            external_code: record.unique_code().map(str::to_owned),
            image,
            gallery,
            category_ids,
            attributes,
        };

        self.store.upsert_product(&product).await?;
        tracing::debug!(sku = %sku, status = %status, "simple product saved");
        Ok(())
    }

    async fn save_variable(&self, group: &SkuGroup) -> Result<(), ItemError> {
        let sku = &group.sku;
        let first = &group.records[0];

        self.clear_kind_mismatch(sku, ProductKind::Variable).await?;

        let image = resolve_principal_image(self.store, self.media_base_url, first).await?;
        let gallery = resolve_gallery(self.store, self.media_base_url, first).await?;
        let category_ids = resolve_categories(self.store, first).await;
        let attributes = extract_attributes(self.store, &group.records).await;

        // The parent is saved draft-first; its real status depends on how the
        // variations land and is set at the end.
        let parent = CatalogProduct {
            sku: sku.clone(),
            kind: ProductKind::Variable,
            status: ProductStatus::Draft,
            name: first.title().to_owned(),
            description: first.description().to_owned(),
            prices: PricePair::default(),
            manage_stock: false,
            stock_quantity: None,
            low_stock_threshold: None,
            external_code: first.unique_code().map(str::to_owned),
            image,
            gallery,
            category_ids,
            attributes,
        };
        let parent_id = self.store.upsert_product(&parent).await?;

        let existing_variations = self.store.variations_of(parent_id).await?;
        let mut current_codes: HashSet<String> = HashSet::new();
        let mut published_count = 0usize;

        for record in &group.records {
            match self.save_variation(parent_id, record).await {
                Ok(saved) => {
                    if saved.status == ProductStatus::Published {
                        published_count += 1;
                    }
                    current_codes.insert(saved.code);
                }
                Err(e) => {
                    // One bad variation must not take down its siblings or
                    // the parent. Left out of current_codes, it is drafted
                    // here and stays draft through the stale sweep below.
                    tracing::warn!(
                        sku = %sku,
                        code = record.unique_code().unwrap_or("<missing>"),
                        error = %e,
                        "variation failed — forcing draft"
                    );
                    if let Some(code) = record.unique_code() {
                        if let Err(draft_err) = self.store.draft_variation_by_code(code).await {
                            tracing::error!(
                                code = %code,
                                error = %draft_err,
                                "could not draft failed variation"
                            );
                        }
                    }
                }
            }
        }

        // Variations that existed before but are absent from this batch are
        // soft-removed, not deleted.
        for stale in existing_variations
            .iter()
            .filter(|v| !current_codes.contains(&v.code))
        {
            self.store
                .set_variation_status(stale.id, ProductStatus::Draft)
                .await?;
            tracing::debug!(sku = %sku, code = %stale.code, "drafted stale variation");
        }

        let status = parent_status(image.is_some(), published_count);
        self.store.set_product_status(parent_id, status).await?;
        tracing::debug!(
            sku = %sku,
            status = %status,
            published_variations = published_count,
            "variable product saved"
        );
        Ok(())
    }

    async fn save_variation(
        &self,
        parent_id: ProductId,
        record: &RawRecord,
    ) -> Result<SavedVariation, ItemError> {
        let code = record
            .unique_code()
            .ok_or(ItemError::MissingUniqueCode)?
            .to_owned();

        let attribute_values = variation_attributes(self.store, record).await;
        let image = resolve_principal_image(self.store, self.media_base_url, record).await?;

        let regular_price = record.regular_price();
        let stock_quantity = record.stock_quantity();
        let status = variation_status(regular_price, stock_quantity);

        let variation = CatalogVariation {
            code: code.clone(),
            status,
            prices: PricePair::from_feed(regular_price, record.sale_price()),
            stock_quantity,
            low_stock_threshold: record.low_stock_threshold(),
            in_stock: stock_quantity > 0,
            attribute_values,
            image,
        };

        self.store.upsert_variation(parent_id, &variation).await?;
        Ok(SavedVariation { code, status })
    }
}


#[cfg(test)]
#[path = "reconcile_test.rs"]
mod scenario_tests;
