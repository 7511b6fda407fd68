//! In-memory catalog store.
//!
//! Backs the engine's unit tests and the CLI's `sync full --dry-run`, which
//! reconciles the whole feed against an empty in-memory catalog to report
//! what a real run would write.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use colibri_core::{
    slugify, CatalogProduct, CatalogVariation, PricePair, ProductStatus, StaleDraft,
};

use crate::store::{
    CatalogStore, CategoryId, MediaId, ProductId, ProductRef, TaxonomyId, TermRef, VariationId,
    VariationRef,
};
use crate::CatalogError;

/// A product as held by [`MemoryCatalog`], including its trash flag.
#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub id: ProductId,
    pub trashed: bool,
    pub product: CatalogProduct,
}

/// A variation as held by [`MemoryCatalog`].
#[derive(Debug, Clone)]
pub struct StoredVariation {
    pub id: VariationId,
    pub parent: ProductId,
    pub variation: CatalogVariation,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    products: Vec<StoredProduct>,
    variations: Vec<StoredVariation>,
    taxonomies: Vec<(TaxonomyId, String, String)>,
    terms: Vec<(i64, TaxonomyId, String, String)>,
    categories: Vec<(CategoryId, String)>,
    media: Vec<(MediaId, String)>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mutex-guarded in-memory implementation of [`CatalogStore`].
///
/// Never returns `Err`; the trait's fallibility exists for the Postgres
/// implementation.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: Mutex<Inner>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a stored media file so image resolution can match it.
    pub fn insert_media(&self, url: &str) -> MediaId {
        let mut inner = self.lock();
        if let Some((id, _)) = inner.media.iter().find(|(_, u)| u == url) {
            return *id;
        }
        let id = inner.next_id();
        inner.media.push((id, url.to_owned()));
        id
    }

    /// Snapshot of the live (non-trashed) product with this SKU.
    #[must_use]
    pub fn product(&self, sku: &str) -> Option<StoredProduct> {
        self.lock()
            .products
            .iter()
            .find(|p| !p.trashed && p.product.sku == sku)
            .cloned()
    }

    /// Snapshot of the variation with this unique code.
    #[must_use]
    pub fn variation(&self, code: &str) -> Option<StoredVariation> {
        self.lock()
            .variations
            .iter()
            .find(|v| v.variation.code == code)
            .cloned()
    }

    /// Whether any trashed product exists for this SKU.
    #[must_use]
    pub fn has_trashed(&self, sku: &str) -> bool {
        self.lock()
            .products
            .iter()
            .any(|p| p.trashed && p.product.sku == sku)
    }

    /// Number of live products.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.lock().products.iter().filter(|p| !p.trashed).count()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductRef>, CatalogError> {
        Ok(self
            .lock()
            .products
            .iter()
            .find(|p| !p.trashed && p.product.sku == sku)
            .map(|p| ProductRef {
                id: p.id,
                kind: p.product.kind,
                status: p.product.status,
            }))
    }

    async fn trash_product(&self, id: ProductId) -> Result<(), CatalogError> {
        let mut inner = self.lock();
        if let Some(p) = inner.products.iter_mut().find(|p| p.id == id) {
            p.trashed = true;
        }
        Ok(())
    }

    async fn upsert_product(&self, product: &CatalogProduct) -> Result<ProductId, CatalogError> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .products
            .iter_mut()
            .find(|p| !p.trashed && p.product.sku == product.sku)
        {
            existing.product = product.clone();
            return Ok(existing.id);
        }
        let id = inner.next_id();
        inner.products.push(StoredProduct {
            id,
            trashed: false,
            product: product.clone(),
        });
        Ok(id)
    }

    async fn set_product_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<bool, CatalogError> {
        let mut inner = self.lock();
        match inner.products.iter_mut().find(|p| p.id == id) {
            Some(p) if p.product.status != status => {
                p.product.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn draft_product_by_sku(&self, sku: &str) -> Result<bool, CatalogError> {
        let mut inner = self.lock();
        match inner
            .products
            .iter_mut()
            .find(|p| !p.trashed && p.product.sku == sku)
        {
            Some(p) if p.product.status != ProductStatus::Draft => {
                p.product.status = ProductStatus::Draft;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_skus(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .lock()
            .products
            .iter()
            .filter(|p| !p.trashed)
            .map(|p| p.product.sku.clone())
            .collect())
    }

    async fn list_stale_drafts(&self) -> Result<Vec<StaleDraft>, CatalogError> {
        Ok(self
            .lock()
            .products
            .iter()
            .filter(|p| {
                !p.trashed && p.product.status == ProductStatus::Draft && p.product.image.is_none()
            })
            .map(|p| StaleDraft {
                id: p.id,
                sku: p.product.sku.clone(),
                name: p.product.name.clone(),
            })
            .collect())
    }

    async fn variations_of(
        &self,
        parent: ProductId,
    ) -> Result<Vec<VariationRef>, CatalogError> {
        Ok(self
            .lock()
            .variations
            .iter()
            .filter(|v| v.parent == parent)
            .map(|v| VariationRef {
                id: v.id,
                code: v.variation.code.clone(),
                status: v.variation.status,
            })
            .collect())
    }

    async fn upsert_variation(
        &self,
        parent: ProductId,
        variation: &CatalogVariation,
    ) -> Result<VariationId, CatalogError> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .variations
            .iter_mut()
            .find(|v| v.parent == parent && v.variation.code == variation.code)
        {
            existing.variation = variation.clone();
            return Ok(existing.id);
        }
        let id = inner.next_id();
        inner.variations.push(StoredVariation {
            id,
            parent,
            variation: variation.clone(),
        });
        Ok(id)
    }

    async fn set_variation_status(
        &self,
        id: VariationId,
        status: ProductStatus,
    ) -> Result<bool, CatalogError> {
        let mut inner = self.lock();
        match inner.variations.iter_mut().find(|v| v.id == id) {
            Some(v) if v.variation.status != status => {
                v.variation.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn draft_variation_by_code(&self, code: &str) -> Result<bool, CatalogError> {
        let mut inner = self.lock();
        match inner
            .variations
            .iter_mut()
            .find(|v| v.variation.code == code)
        {
            Some(v) if v.variation.status != ProductStatus::Draft => {
                v.variation.status = ProductStatus::Draft;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ensure_attribute_taxonomy(
        &self,
        slug: &str,
        label: &str,
    ) -> Result<TaxonomyId, CatalogError> {
        let mut inner = self.lock();
        if let Some((id, _, _)) = inner.taxonomies.iter().find(|(_, s, _)| s == slug) {
            return Ok(*id);
        }
        let id = inner.next_id();
        inner.taxonomies.push((id, slug.to_owned(), label.to_owned()));
        Ok(id)
    }

    async fn ensure_term(
        &self,
        taxonomy: TaxonomyId,
        name: &str,
    ) -> Result<TermRef, CatalogError> {
        let mut inner = self.lock();
        if let Some((id, _, _, slug)) = inner
            .terms
            .iter()
            .find(|(_, tax, n, _)| *tax == taxonomy && n == name)
        {
            return Ok(TermRef {
                id: *id,
                slug: slug.clone(),
            });
        }
        let id = inner.next_id();
        let slug = slugify(name);
        inner
            .terms
            .push((id, taxonomy, name.to_owned(), slug.clone()));
        Ok(TermRef { id, slug })
    }

    async fn ensure_category(&self, name: &str) -> Result<CategoryId, CatalogError> {
        let mut inner = self.lock();
        if let Some((id, _)) = inner.categories.iter().find(|(_, n)| n == name) {
            return Ok(*id);
        }
        let id = inner.next_id();
        inner.categories.push((id, name.to_owned()));
        Ok(id)
    }

    async fn find_image_by_url(&self, url: &str) -> Result<Option<MediaId>, CatalogError> {
        Ok(self
            .lock()
            .media
            .iter()
            .find(|(_, u)| u == url)
            .map(|(id, _)| *id))
    }

    async fn update_price_and_stock(
        &self,
        sku: &str,
        prices: PricePair,
        stock_quantity: i32,
    ) -> Result<bool, CatalogError> {
        let mut inner = self.lock();
        match inner
            .products
            .iter_mut()
            .find(|p| !p.trashed && p.product.sku == sku)
        {
            Some(p) => {
                p.product.prices = prices;
                p.product.stock_quantity = Some(stock_quantity);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colibri_core::ProductKind;

    fn product(sku: &str, kind: ProductKind, status: ProductStatus) -> CatalogProduct {
        CatalogProduct {
            sku: sku.to_owned(),
            kind,
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

    #[tokio::test]
    async fn upsert_is_keyed_by_sku() {
        let store = MemoryCatalog::new();
        let id1 = store
            .upsert_product(&product("A1", ProductKind::Simple, ProductStatus::Published))
            .await
            .unwrap();
        let id2 = store
            .upsert_product(&product("A1", ProductKind::Simple, ProductStatus::Draft))
            .await
            .unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.product_count(), 1);
        assert_eq!(
            store.product("A1").unwrap().product.status,
            ProductStatus::Draft
        );
    }

    #[tokio::test]
    async fn trash_frees_the_sku() {
        let store = MemoryCatalog::new();
        let id = store
            .upsert_product(&product("A1", ProductKind::Simple, ProductStatus::Published))
            .await
            .unwrap();
        store.trash_product(id).await.unwrap();

        assert!(store.find_by_sku("A1").await.unwrap().is_none());
        assert!(store.has_trashed("A1"));

        let fresh = store
            .upsert_product(&product("A1", ProductKind::Variable, ProductStatus::Draft))
            .await
            .unwrap();
        assert_ne!(id, fresh, "a trashed entry must not be reused");
    }

    #[tokio::test]
    async fn draft_by_sku_reports_changes_only_once() {
        let store = MemoryCatalog::new();
        store
            .upsert_product(&product("A1", ProductKind::Simple, ProductStatus::Published))
            .await
            .unwrap();

        assert!(store.draft_product_by_sku("A1").await.unwrap());
        assert!(!store.draft_product_by_sku("A1").await.unwrap());
        assert!(!store.draft_product_by_sku("missing").await.unwrap());
    }

    #[tokio::test]
    async fn ensure_term_is_idempotent_and_slugs() {
        let store = MemoryCatalog::new();
        let tax = store
            .ensure_attribute_taxonomy("color", "Color")
            .await
            .unwrap();
        let first = store.ensure_term(tax, "Azul Marino").await.unwrap();
        let second = store.ensure_term(tax, "Azul Marino").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.slug, "azul-marino");
    }
}
