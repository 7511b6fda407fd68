use super::*;
use crate::group_by_sku;
use colibri_catalog::MemoryCatalog;
use serde_json::json;

const MEDIA_BASE: &str = "https://shop.example.com/wp-content/uploads/";

fn records(value: serde_json::Value) -> Vec<RawRecord> {
    serde_json::from_value(value).unwrap()
}

fn one_group(value: serde_json::Value) -> SkuGroup {
    let mut groups = group_by_sku(records(value));
    assert_eq!(groups.len(), 1, "fixture must collapse to one group");
    groups.remove(0)
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

#[tokio::test]
async fn simple_group_publishes_from_first_records_fields() {
    let store = MemoryCatalog::new();
    store.insert_media("https://shop.example.com/wp-content/uploads/a1.jpg");

    let group = one_group(json!([
        {
            "CODIGO_SKU": "A1", "CODIGO_UNICO": "A1-V1", "TIPO_DE_PRODUCTO": "simple",
            "TITULO": "Camisa Lino", "DESCRIPCION_CORTA": "Primera",
            "PRECIO_NORMAL": 50, "STOCK": 3, "IMAGEN_PRINCIPAL": "a1.jpg",
            "CATEGORIAS_CONCATENADAS": "Ropa > Camisas"
        },
        {
            "CODIGO_SKU": "A1", "CODIGO_UNICO": "A1-V2", "TIPO_DE_PRODUCTO": "simple",
            "TITULO": "Titulo Ignorado", "PRECIO_NORMAL": 99, "STOCK": 0
        }
    ]));

    Reconciler::new(&store, MEDIA_BASE)
        .reconcile_group(&group)
        .await
        .unwrap();

    let saved = store.product("A1").expect("product must exist").product;
    assert_eq!(saved.status, ProductStatus::Published);
    assert_eq!(saved.kind, ProductKind::Simple);
    assert_eq!(saved.name, "Camisa Lino", "first record is authoritative");
    assert_eq!(saved.description, "Primera");
    assert_eq!(saved.prices.regular, Some(dec(50)));
    assert_eq!(saved.stock_quantity, Some(3));
    assert!(saved.manage_stock);
    assert_eq!(saved.external_code.as_deref(), Some("A1-V1"));
    assert!(saved.image.is_some());
    assert_eq!(saved.category_ids.len(), 2);
}

#[tokio::test]
async fn simple_without_resolvable_image_is_draft() {
    let store = MemoryCatalog::new();

    let group = one_group(json!([{
        "CODIGO_SKU": "A1", "CODIGO_UNICO": "A1-V1", "TIPO_DE_PRODUCTO": "simple",
        "TITULO": "Camisa", "PRECIO_NORMAL": 50, "STOCK": 3,
        "IMAGEN_PRINCIPAL": "inexistente.jpg"
    }]));

    Reconciler::new(&store, MEDIA_BASE)
        .reconcile_group(&group)
        .await
        .unwrap();

    let saved = store.product("A1").unwrap().product;
    assert_eq!(saved.status, ProductStatus::Draft);
    assert_eq!(
        saved.prices.regular,
        Some(dec(50)),
        "prices are still written; only the status is held back"
    );
}

#[tokio::test]
async fn simple_sale_price_follows_the_ordering_rule() {
    let store = MemoryCatalog::new();
    store.insert_media("https://shop.example.com/wp-content/uploads/a1.jpg");

    let group = one_group(json!([{
        "CODIGO_SKU": "A1", "CODIGO_UNICO": "A1-V1", "TIPO_DE_PRODUCTO": "simple",
        "TITULO": "Camisa", "PRECIO_NORMAL": "50.00", "PRECIO_DESCUENTO": "60.00",
        "STOCK": 3, "IMAGEN_PRINCIPAL": "a1.jpg"
    }]));

    Reconciler::new(&store, MEDIA_BASE)
        .reconcile_group(&group)
        .await
        .unwrap();

    let saved = store.product("A1").unwrap().product;
    assert_eq!(saved.prices.sale, None, "sale >= regular is cleared");
}

#[tokio::test]
async fn variable_group_drafts_out_of_stock_variation_and_publishes_parent() {
    let store = MemoryCatalog::new();
    store.insert_media("https://shop.example.com/wp-content/uploads/b2.jpg");

    let group = one_group(json!([
        {
            "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-R", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4,
            "IMAGEN_PRINCIPAL": "b2.jpg",
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color", "VALOR_DE_ATRIBUTO_COLOR": "Rojo",
            "ATRIBUTO_COLOR_ES_VARIABLE": "yes"
        },
        {
            "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-A", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 2,
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color", "VALOR_DE_ATRIBUTO_COLOR": "Azul"
        },
        {
            "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-N", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 0,
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color", "VALOR_DE_ATRIBUTO_COLOR": "Negro"
        }
    ]));

    Reconciler::new(&store, MEDIA_BASE)
        .reconcile_group(&group)
        .await
        .unwrap();

    let parent = store.product("B2").unwrap().product;
    assert_eq!(parent.status, ProductStatus::Published);
    assert_eq!(parent.kind, ProductKind::Variable);
    assert!(!parent.manage_stock, "stock lives on the variations");
    assert_eq!(parent.stock_quantity, None);

    // All three colors reach the parent's attribute term list.
    let color = parent
        .attributes
        .iter()
        .find(|a| a.taxonomy_slug == "color")
        .expect("color attribute on parent");
    assert_eq!(color.term_ids.len(), 3);
    assert!(color.used_for_variations);

    assert_eq!(
        store.variation("B2-R").unwrap().variation.status,
        ProductStatus::Published
    );
    assert_eq!(
        store.variation("B2-A").unwrap().variation.status,
        ProductStatus::Published
    );
    let out_of_stock = store.variation("B2-N").unwrap().variation;
    assert_eq!(out_of_stock.status, ProductStatus::Draft);
    assert!(!out_of_stock.in_stock);

    assert_eq!(
        store.variation("B2-R").unwrap().variation.attribute_values["color"],
        "rojo"
    );
}

#[tokio::test]
async fn variable_parent_without_image_stays_draft() {
    let store = MemoryCatalog::new();

    let group = one_group(json!([{
        "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-R", "TIPO_DE_PRODUCTO": "variable",
        "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4
    }]));

    Reconciler::new(&store, MEDIA_BASE)
        .reconcile_group(&group)
        .await
        .unwrap();

    assert_eq!(store.product("B2").unwrap().product.status, ProductStatus::Draft);
    assert_eq!(
        store.variation("B2-R").unwrap().variation.status,
        ProductStatus::Published,
        "the variation itself is sellable; only the parent lacks an image"
    );
}

#[tokio::test]
async fn kind_mismatch_trashes_and_recreates() {
    let store = MemoryCatalog::new();
    store.insert_media("https://shop.example.com/wp-content/uploads/b2.jpg");

    // First pass stores B2 as a simple product.
    let simple = one_group(json!([{
        "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-V1", "TIPO_DE_PRODUCTO": "simple",
        "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4, "IMAGEN_PRINCIPAL": "b2.jpg"
    }]));
    let reconciler = Reconciler::new(&store, MEDIA_BASE);
    reconciler.reconcile_group(&simple).await.unwrap();
    let simple_id = store.product("B2").unwrap().id;

    // Second pass reclassifies B2 as variable.
    let variable = one_group(json!([{
        "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-V1", "TIPO_DE_PRODUCTO": "variable",
        "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4, "IMAGEN_PRINCIPAL": "b2.jpg"
    }]));
    reconciler.reconcile_group(&variable).await.unwrap();

    let fresh = store.product("B2").unwrap();
    assert_eq!(fresh.product.kind, ProductKind::Variable);
    assert_ne!(fresh.id, simple_id, "mismatched entry is recreated, not coerced");
    assert!(store.has_trashed("B2"), "the old entry is trashed, not deleted");
}

#[tokio::test]
async fn stale_variations_are_drafted_not_deleted() {
    let store = MemoryCatalog::new();
    let reconciler = Reconciler::new(&store, MEDIA_BASE);

    let both = one_group(json!([
        {
            "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-R", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4
        },
        {
            "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-A", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 2
        }
    ]));
    reconciler.reconcile_group(&both).await.unwrap();

    // Next batch only carries B2-R.
    let only_r = one_group(json!([{
        "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-R", "TIPO_DE_PRODUCTO": "variable",
        "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4
    }]));
    reconciler.reconcile_group(&only_r).await.unwrap();

    assert_eq!(
        store.variation("B2-A").unwrap().variation.status,
        ProductStatus::Draft,
        "missing variation is soft-removed"
    );
    assert_eq!(
        store.variation("B2-R").unwrap().variation.status,
        ProductStatus::Published
    );
}

#[tokio::test]
async fn variation_without_unique_code_is_skipped_siblings_survive() {
    let store = MemoryCatalog::new();
    store.insert_media("https://shop.example.com/wp-content/uploads/b2.jpg");

    let group = one_group(json!([
        {
            "CODIGO_SKU": "B2", "CODIGO_UNICO": "B2-R", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 4, "IMAGEN_PRINCIPAL": "b2.jpg"
        },
        {
            "CODIGO_SKU": "B2", "TIPO_DE_PRODUCTO": "variable",
            "TITULO": "Polera", "PRECIO_NORMAL": 30, "STOCK": 2
        }
    ]));

    Reconciler::new(&store, MEDIA_BASE)
        .reconcile_group(&group)
        .await
        .unwrap();

    assert_eq!(store.product("B2").unwrap().product.status, ProductStatus::Published);
    assert_eq!(
        store.variation("B2-R").unwrap().variation.status,
        ProductStatus::Published
    );
}
