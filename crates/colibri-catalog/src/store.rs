//! The catalog store seam between the sync engine and the owning commerce
//! system's persistence.

use async_trait::async_trait;

use colibri_core::{
    CatalogProduct, CatalogVariation, PricePair, ProductKind, ProductStatus, StaleDraft,
};

use crate::CatalogError;

pub type ProductId = i64;
pub type VariationId = i64;
pub type TaxonomyId = i64;
pub type TermId = i64;
pub type CategoryId = i64;
pub type MediaId = i64;

/// Identity, kind, and status of an existing product, as returned by SKU lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub id: ProductId,
    pub kind: ProductKind,
    pub status: ProductStatus,
}

/// Identity, code, and status of an existing variation under some parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationRef {
    pub id: VariationId,
    pub code: String,
    pub status: ProductStatus,
}

/// An attribute term reference: storage id plus the slug used in variation
/// attribute assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRef {
    pub id: TermId,
    pub slug: String,
}

/// Mutating and querying surface of the local product catalog.
///
/// Every call is independently durable; there is no transactional grouping
/// across calls. Status setters report whether a write actually happened so
/// sweeps can be shown idempotent.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Looks up a live (non-trashed) product by its group SKU.
    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductRef>, CatalogError>;

    /// Moves a product (and its variations) to the trash, freeing its SKU.
    /// Used when an existing entry has the wrong kind for the incoming data.
    async fn trash_product(&self, id: ProductId) -> Result<(), CatalogError>;

    /// Creates or updates a product by SKU, replacing every synced field.
    async fn upsert_product(&self, product: &CatalogProduct) -> Result<ProductId, CatalogError>;

    /// Sets a product's status. Returns `true` when the stored status changed.
    async fn set_product_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<bool, CatalogError>;

    /// Drafts the product with the given SKU if it exists and is not already
    /// draft. Returns `true` when a write happened.
    async fn draft_product_by_sku(&self, sku: &str) -> Result<bool, CatalogError>;

    /// SKUs of every live product, any status.
    async fn list_skus(&self) -> Result<Vec<String>, CatalogError>;

    /// Draft products with no principal image, for the stale-draft report.
    async fn list_stale_drafts(&self) -> Result<Vec<StaleDraft>, CatalogError>;

    /// Existing variations under a parent product.
    async fn variations_of(&self, parent: ProductId)
        -> Result<Vec<VariationRef>, CatalogError>;

    /// Creates or updates a variation by its unique code under `parent`.
    async fn upsert_variation(
        &self,
        parent: ProductId,
        variation: &CatalogVariation,
    ) -> Result<VariationId, CatalogError>;

    /// Sets a variation's status. Returns `true` when the stored status changed.
    async fn set_variation_status(
        &self,
        id: VariationId,
        status: ProductStatus,
    ) -> Result<bool, CatalogError>;

    /// Drafts the variation with the given unique code, wherever it lives.
    /// Returns `true` when a write happened.
    async fn draft_variation_by_code(&self, code: &str) -> Result<bool, CatalogError>;

    /// Registers an attribute taxonomy if absent. Idempotent: re-registering
    /// an existing slug returns the existing id and is not an error.
    async fn ensure_attribute_taxonomy(
        &self,
        slug: &str,
        label: &str,
    ) -> Result<TaxonomyId, CatalogError>;

    /// Registers a term under a taxonomy if absent, keyed by display name.
    async fn ensure_term(&self, taxonomy: TaxonomyId, name: &str)
        -> Result<TermRef, CatalogError>;

    /// Registers a category term by name if absent.
    async fn ensure_category(&self, name: &str) -> Result<CategoryId, CatalogError>;

    /// Resolves stored media by exact URL match. A miss is `Ok(None)`.
    async fn find_image_by_url(&self, url: &str) -> Result<Option<MediaId>, CatalogError>;

    /// Targeted price/stock update for one SKU, leaving every other field
    /// untouched. Returns `false` when no live product matches.
    async fn update_price_and_stock(
        &self,
        sku: &str,
        prices: PricePair,
        stock_quantity: i32,
    ) -> Result<bool, CatalogError>;
}
