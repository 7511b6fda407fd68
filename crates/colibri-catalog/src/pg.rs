//! PostgreSQL implementation of [`CatalogStore`].

use async_trait::async_trait;
use sqlx::PgPool;

use colibri_core::{
    slugify, CatalogProduct, CatalogVariation, PricePair, ProductKind, ProductStatus, StaleDraft,
};

use crate::store::{
    CatalogStore, CategoryId, MediaId, ProductId, ProductRef, TaxonomyId, TermRef, VariationId,
    VariationRef,
};
use crate::CatalogError;

/// Catalog store over the `products`, `product_variations`,
/// `attribute_taxonomies`, `attribute_terms`, `categories`, and `media`
/// tables (schema in `<workspace-root>/migrations/`).
///
/// Trashed products keep their row but release the SKU: the unique index on
/// `products(sku)` is partial over `NOT trashed`, so a fresh entry of the
/// correct kind can be created under the same SKU after a kind mismatch.
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductRef>, CatalogError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, kind, status FROM products WHERE sku = $1 AND NOT trashed",
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, kind, status)| ProductRef {
            id,
            kind: ProductKind::parse(&kind),
            status: ProductStatus::parse(&status),
        }))
    }

    async fn trash_product(&self, id: ProductId) -> Result<(), CatalogError> {
        sqlx::query("UPDATE products SET trashed = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_product(&self, product: &CatalogProduct) -> Result<ProductId, CatalogError> {
        let attributes = serde_json::to_value(&product.attributes)?;

        let id: i64 = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products \
                 (sku, kind, status, name, description, regular_price, sale_price, \
                  manage_stock, stock_quantity, low_stock_threshold, external_code, \
                  image_id, gallery, category_ids, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, \
                     $8, $9, $10, $11, \
                     $12, $13, $14, $15::jsonb) \
             ON CONFLICT (sku) WHERE NOT trashed DO UPDATE SET \
                 kind                = EXCLUDED.kind, \
                 status              = EXCLUDED.status, \
                 name                = EXCLUDED.name, \
                 description         = EXCLUDED.description, \
                 regular_price       = EXCLUDED.regular_price, \
                 sale_price          = EXCLUDED.sale_price, \
                 manage_stock        = EXCLUDED.manage_stock, \
                 stock_quantity      = EXCLUDED.stock_quantity, \
                 low_stock_threshold = EXCLUDED.low_stock_threshold, \
                 external_code       = EXCLUDED.external_code, \
                 image_id            = EXCLUDED.image_id, \
                 gallery             = EXCLUDED.gallery, \
                 category_ids        = EXCLUDED.category_ids, \
                 attributes          = EXCLUDED.attributes, \
                 updated_at          = NOW() \
             RETURNING id",
        )
        .bind(&product.sku)
        .bind(product.kind.as_str())
        .bind(product.status.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.prices.regular)
        .bind(product.prices.sale)
        .bind(product.manage_stock)
        .bind(product.stock_quantity)
        .bind(product.low_stock_threshold)
        .bind(&product.external_code)
        .bind(product.image)
        .bind(&product.gallery)
        .bind(&product.category_ids)
        .bind(attributes)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn set_product_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<bool, CatalogError> {
        let rows = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status <> $2",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    async fn draft_product_by_sku(&self, sku: &str) -> Result<bool, CatalogError> {
        let rows = sqlx::query(
            "UPDATE products SET status = 'draft', updated_at = NOW() \
             WHERE sku = $1 AND NOT trashed AND status <> 'draft'",
        )
        .bind(sku)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    async fn list_skus(&self) -> Result<Vec<String>, CatalogError> {
        let skus = sqlx::query_scalar::<_, String>(
            "SELECT sku FROM products WHERE NOT trashed ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(skus)
    }

    async fn list_stale_drafts(&self) -> Result<Vec<StaleDraft>, CatalogError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, sku, name FROM products \
             WHERE NOT trashed AND status = 'draft' AND image_id IS NULL \
             ORDER BY sku",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, sku, name)| StaleDraft { id, sku, name })
            .collect())
    }

    async fn variations_of(
        &self,
        parent: ProductId,
    ) -> Result<Vec<VariationRef>, CatalogError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, code, status FROM product_variations WHERE product_id = $1 ORDER BY id",
        )
        .bind(parent)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, code, status)| VariationRef {
                id,
                code,
                status: ProductStatus::parse(&status),
            })
            .collect())
    }

    async fn upsert_variation(
        &self,
        parent: ProductId,
        variation: &CatalogVariation,
    ) -> Result<VariationId, CatalogError> {
        let attribute_values = serde_json::to_value(&variation.attribute_values)?;

        let id: i64 = sqlx::query_scalar::<_, i64>(
            "INSERT INTO product_variations \
                 (product_id, code, status, regular_price, sale_price, \
                  stock_quantity, low_stock_threshold, in_stock, attribute_values, image_id) \
             VALUES ($1, $2, $3, $4, $5, \
                     $6, $7, $8, $9::jsonb, $10) \
             ON CONFLICT (product_id, code) DO UPDATE SET \
                 status              = EXCLUDED.status, \
                 regular_price       = EXCLUDED.regular_price, \
                 sale_price          = EXCLUDED.sale_price, \
                 stock_quantity      = EXCLUDED.stock_quantity, \
                 low_stock_threshold = EXCLUDED.low_stock_threshold, \
                 in_stock            = EXCLUDED.in_stock, \
                 attribute_values    = EXCLUDED.attribute_values, \
                 image_id            = EXCLUDED.image_id, \
                 updated_at          = NOW() \
             RETURNING id",
        )
        .bind(parent)
        .bind(&variation.code)
        .bind(variation.status.as_str())
        .bind(variation.prices.regular)
        .bind(variation.prices.sale)
        .bind(variation.stock_quantity)
        .bind(variation.low_stock_threshold)
        .bind(variation.in_stock)
        .bind(attribute_values)
        .bind(variation.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn set_variation_status(
        &self,
        id: VariationId,
        status: ProductStatus,
    ) -> Result<bool, CatalogError> {
        let rows = sqlx::query(
            "UPDATE product_variations SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status <> $2",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    async fn draft_variation_by_code(&self, code: &str) -> Result<bool, CatalogError> {
        let rows = sqlx::query(
            "UPDATE product_variations SET status = 'draft', updated_at = NOW() \
             WHERE code = $1 AND status <> 'draft'",
        )
        .bind(code)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    async fn ensure_attribute_taxonomy(
        &self,
        slug: &str,
        label: &str,
    ) -> Result<TaxonomyId, CatalogError> {
        // The no-op DO UPDATE makes RETURNING yield the row on conflict too.
        let id: i64 = sqlx::query_scalar::<_, i64>(
            "INSERT INTO attribute_taxonomies (slug, label) \
             VALUES ($1, $2) \
             ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug \
             RETURNING id",
        )
        .bind(slug)
        .bind(label)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn ensure_term(
        &self,
        taxonomy: TaxonomyId,
        name: &str,
    ) -> Result<TermRef, CatalogError> {
        let (id, slug) = sqlx::query_as::<_, (i64, String)>(
            "INSERT INTO attribute_terms (taxonomy_id, name, slug) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (taxonomy_id, name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, slug",
        )
        .bind(taxonomy)
        .bind(name)
        .bind(slugify(name))
        .fetch_one(&self.pool)
        .await?;
        Ok(TermRef { id, slug })
    }

    async fn ensure_category(&self, name: &str) -> Result<CategoryId, CatalogError> {
        let id: i64 = sqlx::query_scalar::<_, i64>(
            "INSERT INTO categories (name) \
             VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_image_by_url(&self, url: &str) -> Result<Option<MediaId>, CatalogError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM media WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update_price_and_stock(
        &self,
        sku: &str,
        prices: PricePair,
        stock_quantity: i32,
    ) -> Result<bool, CatalogError> {
        let rows = sqlx::query(
            "UPDATE products SET \
                 regular_price  = $2, \
                 sale_price     = $3, \
                 stock_quantity = $4, \
                 manage_stock   = TRUE, \
                 updated_at     = NOW() \
             WHERE sku = $1 AND NOT trashed",
        )
        .bind(sku)
        .bind(prices.regular)
        .bind(prices.sale)
        .bind(stock_quantity)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }
}
