use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the survey table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
/// Used as a `BTreeMap` / `BTreeSet` key downstream, so it must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

// Equality follows `Ord` (bitwise `total_cmp` for floats) so it agrees with `Hash`.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Lossless text form used when writing the value back out (CSV export).
    /// Unlike `Display`, floats keep full precision and a decimal point, so they
    /// read back as floats, and `Null` is empty.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => format!("{v:?}"),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Record – one survey response (one row of the source table)
// ---------------------------------------------------------------------------

/// A single survey response. Columns missing from the source file are simply
/// absent from `fields`; empty cells are stored as [`CellValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(fields: BTreeMap<String, CellValue>) -> Self {
        Self { fields }
    }

    /// Value of `column`, treating a missing column as `None`.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Non-null value of `column`.
    pub fn value(&self, column: &str) -> Option<&CellValue> {
        self.get(column).filter(|v| !v.is_null())
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// SurveyDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct SurveyDataset {
    /// All responses (rows), in file order.
    pub records: Vec<Record>,
    /// Column names in the order they appear in the source file.
    pub column_names: Vec<String>,
    /// For each column the sorted set of distinct non-null values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl SurveyDataset {
    /// Build column indices from the loaded records.
    ///
    /// `header` fixes the column order; columns that only show up inside
    /// records are appended in first-seen order.
    pub fn from_records(header: Vec<String>, records: Vec<Record>) -> Self {
        let mut column_names = header;
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = column_names
            .iter()
            .map(|c| (c.clone(), BTreeSet::new()))
            .collect();

        for rec in &records {
            for (col, val) in &rec.fields {
                if !unique_values.contains_key(col) {
                    column_names.push(col.clone());
                }
                let values = unique_values.entry(col.clone()).or_default();
                if !val.is_null() {
                    values.insert(val.clone());
                }
            }
        }

        SurveyDataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// Borrow every record, in order.
    pub fn all(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        Record::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn ordering_groups_by_variant_first() {
        let mut values = vec![
            CellValue::from("b"),
            CellValue::Float(1.5),
            CellValue::Null,
            CellValue::Integer(3),
            CellValue::Bool(true),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Integer(3),
                CellValue::Float(1.5),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn as_f64_rejects_non_numeric_and_nan() {
        assert_eq!(CellValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::from("4").as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
    }

    #[test]
    fn to_field_keeps_precision_and_blanks_null() {
        assert_eq!(CellValue::Float(12.345678).to_field(), "12.345678");
        assert_eq!(CellValue::Null.to_field(), "");
        assert_eq!(CellValue::from("Norte").to_field(), "Norte");
    }

    #[test]
    fn to_field_keeps_whole_floats_distinct_from_integers() {
        assert_eq!(CellValue::Float(40.0).to_field(), "40.0");
        assert_eq!(CellValue::Integer(40).to_field(), "40");
    }

    #[test]
    fn equality_agrees_with_hash_for_signed_zero() {
        use std::collections::HashSet;
        use std::hash::{BuildHasher, RandomState};

        let pos = CellValue::Float(0.0);
        let neg = CellValue::Float(-0.0);
        assert_ne!(pos, neg);
        assert_eq!(pos.cmp(&neg) == std::cmp::Ordering::Equal, pos == neg);

        let hasher = RandomState::new();
        let same = CellValue::Float(0.0);
        assert_eq!(pos, same);
        assert_eq!(hasher.hash_one(&pos), hasher.hash_one(&same));

        let set: HashSet<CellValue> = [pos, neg, same].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_records_keeps_header_order_and_skips_nulls() {
        let records = vec![
            record(&[("Zona", "Sur".into()), ("Edad", CellValue::Null)]),
            record(&[("Zona", "Norte".into()), ("Edad", CellValue::Integer(40))]),
            record(&[("Zona", "Sur".into()), ("Marca", "Nissan".into())]),
        ];
        let ds = SurveyDataset::from_records(vec!["Zona".into(), "Edad".into()], records);

        assert_eq!(ds.column_names, vec!["Zona", "Edad", "Marca"]);
        assert_eq!(ds.unique_values["Zona"].len(), 2);
        assert_eq!(
            ds.unique_values["Edad"].iter().collect::<Vec<_>>(),
            vec![&CellValue::Integer(40)]
        );
        assert!(ds.has_column("Marca"));
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn record_value_hides_nulls() {
        let rec = record(&[("Edad", CellValue::Null), ("Zona", "Sur".into())]);
        assert_eq!(rec.value("Edad"), None);
        assert_eq!(rec.get("Edad"), Some(&CellValue::Null));
        assert_eq!(rec.value("Zona"), Some(&CellValue::from("Sur")));
        assert_eq!(rec.value("Marca"), None);
    }
}
