use std::collections::{BTreeMap, HashMap};

use super::model::{CellValue, Record};
use super::schema;
use crate::error::MetricUnavailable;

/// A computed statistic, or the reason it has no value.
pub type Metric<T> = Result<T, MetricUnavailable>;

// ---------------------------------------------------------------------------
// Primitive statistics
// ---------------------------------------------------------------------------

/// Values of `field` across `records`, with the no-data reason when there are none.
/// Nulls are dropped.
fn present<'a>(records: &[&'a Record], field: &str) -> Metric<Vec<&'a CellValue>> {
    if records.is_empty() {
        return Err(MetricUnavailable::EmptySubset);
    }
    if !records.iter().any(|r| r.get(field).is_some()) {
        return Err(MetricUnavailable::MissingColumn(field.to_string()));
    }
    let values: Vec<&CellValue> = records.iter().filter_map(|r| r.value(field)).collect();
    if values.is_empty() {
        return Err(MetricUnavailable::NoValues(field.to_string()));
    }
    Ok(values)
}

/// Arithmetic mean of the numeric values of `field`.
pub fn mean(records: &[&Record], field: &str) -> Metric<f64> {
    let values = present(records, field)?;
    let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
    if numbers.is_empty() {
        return Err(MetricUnavailable::NoValues(field.to_string()));
    }
    Ok(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

/// Share (0–100) of non-null `field` values satisfying `predicate`.
pub fn percentage(
    records: &[&Record],
    field: &str,
    predicate: impl Fn(&CellValue) -> bool,
) -> Metric<f64> {
    let values = present(records, field)?;
    let hits = values.iter().filter(|&&v| predicate(v)).count();
    Ok(100.0 * hits as f64 / values.len() as f64)
}

/// Non-null values of `field` with their counts, most frequent first.
/// Equal counts keep the order in which values were first encountered.
pub fn value_counts(records: &[&Record], field: &str) -> Vec<(CellValue, usize)> {
    let mut counts: Vec<(CellValue, usize)> = Vec::new();
    let mut slot: HashMap<&CellValue, usize> = HashMap::new();

    for val in records.iter().filter_map(|r| r.value(field)) {
        match slot.get(val) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(val, counts.len());
                counts.push((val.clone(), 1));
            }
        }
    }

    // Stable: ties stay in first-encounter order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Most frequent non-null value of `field`; ties go to the first encountered.
pub fn mode(records: &[&Record], field: &str) -> Metric<CellValue> {
    present(records, field)?;
    value_counts(records, field)
        .into_iter()
        .next()
        .map(|(val, _)| val)
        .ok_or_else(|| MetricUnavailable::NoValues(field.to_string()))
}

// ---------------------------------------------------------------------------
// Group-wise rankings
// ---------------------------------------------------------------------------

/// One group of a ranking: the group label, its statistic and how many
/// values fed it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat {
    pub group: CellValue,
    pub value: f64,
    pub count: usize,
}

/// Sort descending by value, ties by group label ascending.
fn rank(mut groups: Vec<GroupStat>) -> Vec<GroupStat> {
    groups.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.group.cmp(&b.group))
    });
    groups
}

fn group_values<'a, T>(
    records: &[&'a Record],
    group_field: &str,
    extract: impl Fn(&'a Record) -> Option<T>,
) -> Metric<BTreeMap<&'a CellValue, Vec<T>>> {
    present(records, group_field)?;
    let mut groups: BTreeMap<&CellValue, Vec<T>> = BTreeMap::new();
    for &rec in records {
        let Some(key) = rec.value(group_field) else {
            continue;
        };
        if let Some(v) = extract(rec) {
            groups.entry(key).or_default().push(v);
        }
    }
    Ok(groups)
}

fn non_empty(ranking: Vec<GroupStat>, field: &str) -> Metric<Vec<GroupStat>> {
    if ranking.is_empty() {
        Err(MetricUnavailable::NoValues(field.to_string()))
    } else {
        Ok(ranking)
    }
}

/// Mean of `value_field` per distinct `group_field` value, ranked.
///
/// Groups with no numeric `value_field` are left out of the ranking rather
/// than reported as zero.
pub fn grouped_mean(
    records: &[&Record],
    group_field: &str,
    value_field: &str,
) -> Metric<Vec<GroupStat>> {
    present(records, value_field)?;
    let groups = group_values(records, group_field, |r| r.number(value_field))?;
    let ranking = groups
        .into_iter()
        .map(|(group, values)| GroupStat {
            group: group.clone(),
            value: values.iter().sum::<f64>() / values.len() as f64,
            count: values.len(),
        })
        .collect();
    non_empty(rank(ranking), value_field)
}

/// Share (0–100) of non-null `field` values satisfying `predicate`, per
/// distinct `group_field` value, ranked.
pub fn grouped_percentage(
    records: &[&Record],
    group_field: &str,
    field: &str,
    predicate: impl Fn(&CellValue) -> bool,
) -> Metric<Vec<GroupStat>> {
    present(records, field)?;
    let groups = group_values(records, group_field, |r| r.value(field).map(&predicate))?;
    let ranking = groups
        .into_iter()
        .map(|(group, hits)| GroupStat {
            group: group.clone(),
            value: 100.0 * hits.iter().filter(|h| **h).count() as f64 / hits.len() as f64,
            count: hits.len(),
        })
        .collect();
    non_empty(rank(ranking), field)
}

// ---------------------------------------------------------------------------
// The dashboard's metric set
// ---------------------------------------------------------------------------

/// Every statistic the dashboard shows for one filtered subset.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    pub record_count: usize,
    /// Mean daily fuel consumption (liters).
    pub mean_consumption: Metric<f64>,
    /// Share with medium or high GNV knowledge.
    pub knowledge_pct: Metric<f64>,
    /// Share willing to convert to GNV.
    pub willingness_pct: Metric<f64>,
    /// Share of the "Visionario" adoption profile.
    pub visionary_pct: Metric<f64>,
    pub dominant_fear: Metric<CellValue>,
    /// Zones ranked by willingness share.
    pub zone_willingness: Metric<Vec<GroupStat>>,
    /// Mean consumption inside the top zone of `zone_willingness`.
    pub top_zone_consumption: Metric<f64>,
    /// Unit types ranked by mean consumption.
    pub unit_consumption: Metric<Vec<GroupStat>>,
    pub mean_age: Metric<f64>,
    pub mean_vehicle_year: Metric<f64>,
    pub profile_counts: Vec<(CellValue, usize)>,
    pub fear_counts: Vec<(CellValue, usize)>,
}

/// Compute the full metric set. Pure function of `records`.
pub fn compute(records: &[&Record]) -> MetricSet {
    let zone_willingness = grouped_percentage(
        records,
        schema::ZONE,
        schema::GNV_WILLINGNESS,
        schema::is_affirmative,
    );

    let top_zone_consumption = zone_willingness.as_ref().map_err(Clone::clone).and_then(|ranking| {
        let top = &ranking
            .first()
            .ok_or_else(|| MetricUnavailable::NoValues(schema::ZONE.to_string()))?
            .group;
        let in_zone: Vec<&Record> = records
            .iter()
            .copied()
            .filter(|r| r.value(schema::ZONE) == Some(top))
            .collect();
        mean(&in_zone, schema::DAILY_CONSUMPTION)
    });

    MetricSet {
        record_count: records.len(),
        mean_consumption: mean(records, schema::DAILY_CONSUMPTION),
        knowledge_pct: percentage(records, schema::GNV_KNOWLEDGE, schema::knows_gnv),
        willingness_pct: percentage(records, schema::GNV_WILLINGNESS, schema::is_affirmative),
        visionary_pct: percentage(records, schema::ADOPTION_PROFILE, schema::is_visionary),
        dominant_fear: mode(records, schema::DOMINANT_FEAR),
        zone_willingness,
        top_zone_consumption,
        unit_consumption: grouped_mean(records, schema::UNIT_TYPE, schema::DAILY_CONSUMPTION),
        mean_age: mean(records, schema::AGE),
        mean_vehicle_year: mean(records, schema::VEHICLE_YEAR),
        profile_counts: value_counts(records, schema::ADOPTION_PROFILE),
        fear_counts: value_counts(records, schema::DOMINANT_FEAR),
    }
}
