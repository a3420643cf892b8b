use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Record, SurveyDataset};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per column
// ---------------------------------------------------------------------------

/// Per-column selection: maps column_name → set of allowed values.
/// If a column is absent or its set is empty, it imposes no restriction.
pub type FilterSelection = BTreeMap<String, BTreeSet<CellValue>>;

/// A [`FilterSelection`] with every observed value of `columns` selected.
pub fn full_selection<S: AsRef<str>>(dataset: &SurveyDataset, columns: &[S]) -> FilterSelection {
    columns
        .iter()
        .filter_map(|col| {
            let col = col.as_ref();
            dataset
                .unique_values
                .get(col)
                .map(|vals| (col.to_string(), vals.clone()))
        })
        .collect()
}

/// Whether a single record passes every active column constraint.
///
/// A record passes a column constraint when:
/// * The column is not present in `selection` → passes (no constraint)
/// * The allowed set for that column is empty → passes (no constraint)
/// * The record's value for that column is in the allowed set → passes
///
/// Missing and null values never match a non-empty set.
pub fn matches(record: &Record, selection: &FilterSelection) -> bool {
    selection.iter().all(|(col, allowed)| {
        if allowed.is_empty() {
            return true;
        }
        match record.value(col) {
            Some(val) => allowed.contains(val),
            None => false,
        }
    })
}

/// Return indices of records that pass all active filters, in dataset order.
pub fn filtered_indices(dataset: &SurveyDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| matches(rec, selection))
        .map(|(i, _)| i)
        .collect()
}

/// Return the records that pass all active filters, in dataset order.
pub fn apply<'a>(dataset: &'a SurveyDataset, selection: &FilterSelection) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|rec| matches(rec, selection))
        .collect()
}

/// Whether `selection` restricts anything at all.
pub fn is_unrestricted(selection: &FilterSelection) -> bool {
    selection.values().all(BTreeSet::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{GNV_WILLINGNESS, ZONE};
    use proptest::prelude::*;

    fn dataset(rows: &[(&str, &str)]) -> SurveyDataset {
        let records = rows
            .iter()
            .map(|(zone, will)| {
                let mut fields = BTreeMap::new();
                let zone = if zone.is_empty() { CellValue::Null } else { (*zone).into() };
                fields.insert(ZONE.to_string(), zone);
                fields.insert(GNV_WILLINGNESS.to_string(), (*will).into());
                Record::new(fields)
            })
            .collect();
        SurveyDataset::from_records(vec![ZONE.into(), GNV_WILLINGNESS.into()], records)
    }

    fn select(col: &str, values: &[&str]) -> FilterSelection {
        let mut sel = FilterSelection::new();
        sel.insert(col.to_string(), values.iter().map(|v| CellValue::from(*v)).collect());
        sel
    }

    #[test]
    fn single_column_membership() {
        let ds = dataset(&[("A", "Sí"), ("A", "No"), ("B", "Sí")]);
        let out = filtered_indices(&ds, &select(ZONE, &["A"]));
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn columns_are_combined_with_and() {
        let ds = dataset(&[("A", "Sí"), ("A", "No"), ("B", "Sí")]);
        let mut sel = select(ZONE, &["A", "B"]);
        sel.extend(select(GNV_WILLINGNESS, &["Sí"]));
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 2]);
    }

    #[test]
    fn empty_set_means_no_restriction() {
        let ds = dataset(&[("A", "Sí"), ("B", "No")]);
        let sel = select(ZONE, &[]);
        assert!(is_unrestricted(&sel));
        assert_eq!(apply(&ds, &sel).len(), 2);
        assert_eq!(apply(&ds, &FilterSelection::new()).len(), 2);
    }

    #[test]
    fn nulls_and_missing_columns_never_match() {
        let ds = dataset(&[("", "Sí"), ("A", "No")]);
        assert_eq!(filtered_indices(&ds, &select(ZONE, &["A"])), vec![1]);
        assert!(filtered_indices(&ds, &select("Marca", &["Nissan"])).is_empty());
    }

    #[test]
    fn unknown_value_yields_no_rows() {
        let ds = dataset(&[("A", "Sí"), ("B", "No")]);
        assert!(apply(&ds, &select(ZONE, &["Z"])).is_empty());
    }

    #[test]
    fn full_selection_keeps_every_row_with_a_value() {
        let ds = dataset(&[("A", "Sí"), ("B", "No"), ("", "No")]);
        let sel = full_selection(&ds, &[ZONE, "Marca"]);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel[ZONE].len(), 2);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1]);
    }

    fn zone_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["A", "B", "C", ""]),
                prop::sample::select(vec!["Sí", "No"]),
            )
                .prop_map(|(z, w)| (z.to_string(), w.to_string())),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn apply_returns_an_ordered_subset(
            rows in zone_strategy(),
            zones in prop::collection::btree_set(prop::sample::select(vec!["A", "B", "C", "Z"]), 0..4),
        ) {
            let borrowed: Vec<(&str, &str)> = rows.iter().map(|(z, w)| (z.as_str(), w.as_str())).collect();
            let ds = dataset(&borrowed);
            let zones: Vec<&str> = zones.into_iter().collect();
            let idx = filtered_indices(&ds, &select(ZONE, &zones));

            prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(idx.iter().all(|&i| i < ds.len()));
            let picked = apply(&ds, &select(ZONE, &zones));
            prop_assert_eq!(picked.len(), idx.len());
            for (rec, &i) in picked.iter().zip(&idx) {
                prop_assert!(std::ptr::eq(*rec, &ds.records[i]));
            }
        }

        #[test]
        fn empty_selection_is_identity(rows in zone_strategy()) {
            let borrowed: Vec<(&str, &str)> = rows.iter().map(|(z, w)| (z.as_str(), w.as_str())).collect();
            let ds = dataset(&borrowed);
            let mut sel = select(ZONE, &[]);
            sel.extend(select(GNV_WILLINGNESS, &[]));
            prop_assert_eq!(filtered_indices(&ds, &sel), (0..ds.len()).collect::<Vec<_>>());
        }
    }
}
