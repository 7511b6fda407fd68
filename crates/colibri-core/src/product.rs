//! Write models handed to the catalog store by the reconciliation engine.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::status::{ProductKind, ProductStatus};

/// Regular/sale price pair with the feed's validity rules already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    /// Regular price; `None` clears the stored price (feed sent 0 or less).
    pub regular: Option<Decimal>,
    /// Sale price; only kept when strictly between zero and the regular price.
    pub sale: Option<Decimal>,
}

impl PricePair {
    /// Builds a price pair from raw feed values.
    ///
    /// The regular price is kept only when positive. The sale price is kept
    /// only when `0 < sale < regular`; anything else clears it.
    #[must_use]
    pub fn from_feed(regular: Decimal, sale: Option<Decimal>) -> Self {
        let regular = (regular > Decimal::ZERO).then_some(regular);
        let sale = match (regular, sale) {
            (Some(reg), Some(s)) if s > Decimal::ZERO && s < reg => Some(s),
            _ => None,
        };
        Self { regular, sale }
    }
}

/// A discovered product attribute, backed by an idempotently-registered
/// taxonomy. Identity is `taxonomy_slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub taxonomy_slug: String,
    /// Human display label, e.g. `"Talla"` for slug `talla`.
    pub label: String,
    /// Every distinct term seen for this attribute across the SKU group.
    pub term_ids: Vec<i64>,
    pub visible: bool,
    /// Whether this attribute participates in variation matching. Attributes
    /// with this flag off are still attached to the parent for display.
    pub used_for_variations: bool,
}

/// Full write model for a simple product or a variable parent.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    pub sku: String,
    pub kind: ProductKind,
    pub status: ProductStatus,
    pub name: String,
    pub description: String,
    pub prices: PricePair,
    /// Off for variable parents — stock lives on the variations.
    pub manage_stock: bool,
    pub stock_quantity: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    /// The upstream variation-level unique code, persisted so targeted
    /// price/stock refreshes can address the upstream record.
    pub external_code: Option<String>,
    pub image: Option<i64>,
    pub gallery: Vec<i64>,
    pub category_ids: Vec<i64>,
    pub attributes: Vec<AttributeDefinition>,
}

/// Write model for one variation of a variable product.
#[derive(Debug, Clone)]
pub struct CatalogVariation {
    /// Upstream variation-level unique code; the variation's identity.
    pub code: String,
    pub status: ProductStatus,
    pub prices: PricePair,
    pub stock_quantity: i32,
    pub low_stock_threshold: Option<i32>,
    pub in_stock: bool,
    /// `taxonomy_slug -> term_slug` assignment for variation matching.
    pub attribute_values: BTreeMap<String, String>,
    pub image: Option<i64>,
}

/// A draft catalog entry with no principal image, as surfaced by the
/// stale-draft report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleDraft {
    pub id: i64,
    pub sku: String,
    pub name: String,
}
