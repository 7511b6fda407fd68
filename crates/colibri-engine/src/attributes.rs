//! Discovery and resolution of dynamically-named attribute columns.
//!
//! The feed carries attributes as per-export column families:
//! `NOMBRE_DE_ATRIBUTO_<SLUG>` (display name), `VALOR_DE_ATRIBUTO_<SLUG>`
//! (value on that row), `ATRIBUTO_VISIBLE_<SLUG>` (storefront visibility),
//! and `ATRIBUTO_<SLUG>_ES_VARIABLE` (participates in variation matching;
//! the older exporter spelled it `ATRIBUTO_<SLUG>_VARIABLE`).
//!
//! Extraction is two-pass: a schema-discovery pass over the first record's
//! keys producing typed [`AttributeKeys`] tuples, then a resolution pass
//! that registers taxonomies/terms and collects values across the group.

use std::collections::BTreeMap;

use colibri_catalog::CatalogStore;
use colibri_core::{label_from_slug, slugify, AttributeDefinition};
use colibri_feed::RawRecord;

const NAME_KEY_PREFIX: &str = "NOMBRE_DE_ATRIBUTO_";
const AFFIRMATIVE: &str = "yes";

/// Column names of one discovered attribute family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeKeys {
    /// Raw column-family suffix, e.g. `COLOR`.
    pub raw_slug: String,
    pub name_key: String,
    pub value_key: String,
    pub visible_key: String,
    pub variable_key: String,
    /// Older exporter spelling, consulted when `variable_key` is absent.
    pub legacy_variable_key: String,
}

/// Scans a record's extra columns for attribute families.
///
/// A family is only kept when both its name column and its value column are
/// present on the record — a name without a value (or vice versa, which this
/// scan cannot even see) is ignored entirely.
#[must_use]
pub fn discover_attribute_keys(record: &RawRecord) -> Vec<AttributeKeys> {
    let mut keys = Vec::new();

    for key in record.extra.keys() {
        let Some(raw_slug) = key.strip_prefix(NAME_KEY_PREFIX) else {
            continue;
        };
        if raw_slug.is_empty() {
            continue;
        }

        let value_key = format!("VALOR_DE_ATRIBUTO_{raw_slug}");
        if !record.extra.contains_key(&value_key) {
            continue;
        }

        keys.push(AttributeKeys {
            raw_slug: raw_slug.to_owned(),
            name_key: key.clone(),
            value_key,
            visible_key: format!("ATRIBUTO_VISIBLE_{raw_slug}"),
            variable_key: format!("ATRIBUTO_{raw_slug}_ES_VARIABLE"),
            legacy_variable_key: format!("ATRIBUTO_{raw_slug}_VARIABLE"),
        });
    }

    keys
}

fn is_affirmative(value: Option<String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case(AFFIRMATIVE))
}

/// Resolves the attribute set for a SKU group.
///
/// The first record defines which attributes exist and their flags; values
/// are collected across *all* records so a variable product's parent carries
/// every term its variations use. Registration is idempotent. A taxonomy or
/// term that fails to register is logged and skipped — it never aborts the
/// group.
pub async fn extract_attributes<S: CatalogStore + ?Sized>(
    store: &S,
    records: &[RawRecord],
) -> Vec<AttributeDefinition> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    let mut definitions = Vec::new();

    for keys in discover_attribute_keys(first) {
        let Some(display_name) = first.extra_text(&keys.name_key) else {
            continue;
        };
        let taxonomy_slug = slugify(&display_name);
        if taxonomy_slug.is_empty() {
            continue;
        }
        let label = label_from_slug(&taxonomy_slug);

        let taxonomy = match store.ensure_attribute_taxonomy(&taxonomy_slug, &label).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    taxonomy = %taxonomy_slug,
                    error = %e,
                    "failed to register attribute taxonomy — skipping attribute"
                );
                continue;
            }
        };

        // Distinct values across the whole group, first-seen order.
        let mut values: Vec<String> = Vec::new();
        for record in records {
            if let Some(value) = record.extra_text(&keys.value_key) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }

        let mut term_ids = Vec::with_capacity(values.len());
        for value in &values {
            match store.ensure_term(taxonomy, value).await {
                Ok(term) => term_ids.push(term.id),
                Err(e) => {
                    tracing::error!(
                        taxonomy = %taxonomy_slug,
                        term = %value,
                        error = %e,
                        "failed to register attribute term — skipping term"
                    );
                }
            }
        }

        let visible = is_affirmative(first.extra_text(&keys.visible_key));
        let used_for_variations = match first.extra_text(&keys.variable_key) {
            Some(flag) => is_affirmative(Some(flag)),
            None => is_affirmative(first.extra_text(&keys.legacy_variable_key)),
        };

        definitions.push(AttributeDefinition {
            taxonomy_slug,
            label,
            term_ids,
            visible,
            used_for_variations,
        });
    }

    definitions
}

/// Resolves the attribute-value assignment for a single variation.
///
/// Only the one value present on this record is resolved per attribute;
/// empty values and terms that cannot be registered are skipped without
/// failing the variation.
pub async fn variation_attributes<S: CatalogStore + ?Sized>(
    store: &S,
    record: &RawRecord,
) -> BTreeMap<String, String> {
    let mut assignment = BTreeMap::new();

    for keys in discover_attribute_keys(record) {
        let Some(display_name) = record.extra_text(&keys.name_key) else {
            continue;
        };
        let Some(value) = record.extra_text(&keys.value_key) else {
            continue;
        };

        let taxonomy_slug = slugify(&display_name);
        if taxonomy_slug.is_empty() {
            continue;
        }
        let label = label_from_slug(&taxonomy_slug);

        let taxonomy = match store.ensure_attribute_taxonomy(&taxonomy_slug, &label).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    taxonomy = %taxonomy_slug,
                    error = %e,
                    "failed to resolve taxonomy for variation — skipping attribute"
                );
                continue;
            }
        };

        match store.ensure_term(taxonomy, &value).await {
            Ok(term) => {
                assignment.insert(taxonomy_slug, term.slug);
            }
            Err(e) => {
                tracing::error!(
                    taxonomy = %taxonomy_slug,
                    term = %value,
                    error = %e,
                    "failed to resolve term for variation — skipping attribute"
                );
            }
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use colibri_catalog::MemoryCatalog;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn discovery_requires_both_name_and_value_columns() {
        let rec = record(json!({
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
            "VALOR_DE_ATRIBUTO_COLOR": "Rojo",
            "NOMBRE_DE_ATRIBUTO_TALLA": "Talla"
        }));

        let keys = discover_attribute_keys(&rec);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].raw_slug, "COLOR");
        assert_eq!(keys[0].value_key, "VALOR_DE_ATRIBUTO_COLOR");
        assert_eq!(keys[0].variable_key, "ATRIBUTO_COLOR_ES_VARIABLE");
    }

    #[test]
    fn value_column_without_name_column_is_invisible() {
        let rec = record(json!({ "VALOR_DE_ATRIBUTO_COLOR": "Rojo" }));
        assert!(discover_attribute_keys(&rec).is_empty());
    }

    #[tokio::test]
    async fn collects_distinct_values_across_the_group() {
        let store = MemoryCatalog::new();
        let records = vec![
            record(json!({
                "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
                "VALOR_DE_ATRIBUTO_COLOR": "Rojo",
                "ATRIBUTO_VISIBLE_COLOR": "YES",
                "ATRIBUTO_COLOR_ES_VARIABLE": "yes"
            })),
            record(json!({
                "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
                "VALOR_DE_ATRIBUTO_COLOR": "Azul"
            })),
            record(json!({
                "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
                "VALOR_DE_ATRIBUTO_COLOR": "Rojo"
            })),
        ];

        let defs = extract_attributes(&store, &records).await;
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.taxonomy_slug, "color");
        assert_eq!(def.label, "Color");
        assert_eq!(def.term_ids.len(), 2, "Rojo and Azul, deduplicated");
        assert!(def.visible, "YES must match case-insensitively");
        assert!(def.used_for_variations);
    }

    #[tokio::test]
    async fn legacy_variable_column_is_honored_when_modern_one_is_absent() {
        let store = MemoryCatalog::new();
        let records = vec![record(json!({
            "NOMBRE_DE_ATRIBUTO_TALLA": "Talla",
            "VALOR_DE_ATRIBUTO_TALLA": 38,
            "ATRIBUTO_TALLA_VARIABLE": "yes"
        }))];

        let defs = extract_attributes(&store, &records).await;
        assert_eq!(defs.len(), 1);
        assert!(defs[0].used_for_variations);
        assert!(!defs[0].visible);
    }

    #[tokio::test]
    async fn non_affirmative_flags_are_false() {
        let store = MemoryCatalog::new();
        let records = vec![record(json!({
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
            "VALOR_DE_ATRIBUTO_COLOR": "Rojo",
            "ATRIBUTO_VISIBLE_COLOR": "no",
            "ATRIBUTO_COLOR_ES_VARIABLE": "1"
        }))];

        let defs = extract_attributes(&store, &records).await;
        assert!(!defs[0].visible);
        assert!(!defs[0].used_for_variations);
    }

    #[tokio::test]
    async fn re_extraction_is_idempotent() {
        let store = MemoryCatalog::new();
        let records = vec![record(json!({
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
            "VALOR_DE_ATRIBUTO_COLOR": "Rojo"
        }))];

        let first = extract_attributes(&store, &records).await;
        let second = extract_attributes(&store, &records).await;
        assert_eq!(first, second, "re-registration must reuse the same ids");
    }

    #[tokio::test]
    async fn variation_assignment_skips_empty_values() {
        let store = MemoryCatalog::new();
        let rec = record(json!({
            "NOMBRE_DE_ATRIBUTO_COLOR": "Color",
            "VALOR_DE_ATRIBUTO_COLOR": "Azul Marino",
            "NOMBRE_DE_ATRIBUTO_TALLA": "Talla",
            "VALOR_DE_ATRIBUTO_TALLA": ""
        }));

        let assignment = variation_attributes(&store, &rec).await;
        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.get("color").map(String::as_str), Some("azul-marino"));
    }
}
