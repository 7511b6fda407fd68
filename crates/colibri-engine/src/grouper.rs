//! Groups flat feed records into per-SKU variant groups.

use std::collections::HashMap;

use colibri_feed::RawRecord;

/// Ordered sequence of records sharing one group SKU. Always non-empty.
#[derive(Debug)]
pub struct SkuGroup {
    pub sku: String,
    pub records: Vec<RawRecord>,
}

/// Partitions records by group SKU.
///
/// Groups appear in order of their SKU's first appearance; records keep
/// their arrival order within each group. Records without a `CODIGO_SKU`
/// carry no identity at all, so they are dropped with a warning rather than
/// drafted.
#[must_use]
pub fn group_by_sku(records: Vec<RawRecord>) -> Vec<SkuGroup> {
    let mut groups: Vec<SkuGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(sku) = record.group_sku().map(str::to_owned) else {
            tracing::warn!("feed record without CODIGO_SKU — skipping");
            continue;
        };

        match index.get(&sku) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(sku.clone(), groups.len());
                groups.push(SkuGroup {
                    sku,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(sku: Option<&str>, code: &str) -> RawRecord {
        let mut value = json!({ "CODIGO_UNICO": code });
        if let Some(sku) = sku {
            value["CODIGO_SKU"] = json!(sku);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn groups_preserve_first_appearance_order() {
        let groups = group_by_sku(vec![
            record(Some("B2"), "B2-1"),
            record(Some("A1"), "A1-1"),
            record(Some("B2"), "B2-2"),
        ]);

        let skus: Vec<&str> = groups.iter().map(|g| g.sku.as_str()).collect();
        assert_eq!(skus, vec!["B2", "A1"]);

        let b2_codes: Vec<_> = groups[0]
            .records
            .iter()
            .map(|r| r.unique_code().unwrap())
            .collect();
        assert_eq!(b2_codes, vec!["B2-1", "B2-2"]);
    }

    #[test]
    fn records_without_sku_are_dropped() {
        let groups = group_by_sku(vec![
            record(None, "X-1"),
            record(Some(""), "X-2"),
            record(Some("A1"), "A1-1"),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sku, "A1");
        assert_eq!(groups[0].records.len(), 1);
    }

    #[test]
    fn grouping_is_stable_over_its_own_output() {
        let input = vec![
            record(Some("B2"), "B2-1"),
            record(Some("A1"), "A1-1"),
            record(Some("B2"), "B2-2"),
            record(Some("C3"), "C3-1"),
        ];

        let once = group_by_sku(input);
        let flattened: Vec<RawRecord> = once
            .iter()
            .flat_map(|g| g.records.iter().cloned())
            .collect();
        let twice = group_by_sku(flattened);

        let shape =
            |gs: &[SkuGroup]| -> Vec<(String, Vec<String>)> {
                gs.iter()
                    .map(|g| {
                        (
                            g.sku.clone(),
                            g.records
                                .iter()
                                .map(|r| r.unique_code().unwrap().to_owned())
                                .collect(),
                        )
                    })
                    .collect()
            };

        assert_eq!(shape(&once), shape(&twice));
    }
}
