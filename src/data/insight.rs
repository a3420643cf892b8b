use super::metrics::MetricSet;

/// Derive the dashboard's strategic insights from a metric set.
///
/// Order is fixed: best zone, dominant fear, most fuel-intensive unit type,
/// visionary share. An insight whose metrics are unavailable is skipped.
pub fn generate(metrics: &MetricSet) -> Vec<String> {
    let mut insights = Vec::with_capacity(4);

    if let (Ok(zones), Ok(consumption)) = (&metrics.zone_willingness, &metrics.top_zone_consumption) {
        if let Some(top) = zones.first() {
            insights.push(format!(
                "Zone {} shows the highest willingness to convert ({:.1}%), with an average \
                 consumption of {consumption:.1} L/day. It is a priority segment.",
                top.group, top.value
            ));
        }
    }

    if let Ok(fear) = &metrics.dominant_fear {
        insights.push(format!(
            "The dominant fear is {fear}. Prepare educational messaging that addresses this objection."
        ));
    }

    if let Ok(units) = &metrics.unit_consumption {
        if let Some(top) = units.first() {
            insights.push(format!(
                "The unit type with the highest average consumption is {} ({:.1} L/day). \
                 Ideal for the first campaigns.",
                top.group, top.value
            ));
        }
    }

    if let Ok(pct) = metrics.visionary_pct {
        insights.push(format!(
            "{pct:.1}% of the filtered operators are visionaries. Focus phase 1 on them."
        ));
    }

    insights
}
