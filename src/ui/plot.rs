use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::{ColorMap, generate_palette};
use crate::data::metrics::{GroupStat, MetricSet};
use crate::data::model::CellValue;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Bar charts (central panel)
// ---------------------------------------------------------------------------

/// One bar per category, one legend entry per bar.
fn category_bars(values: &[(CellValue, f64)], color: impl Fn(usize, &CellValue) -> Color32) -> Vec<BarChart> {
    values
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let name = label.to_string();
            let bar = Bar::new(i as f64, *value).name(&name).fill(color(i, label));
            BarChart::new(vec![bar]).name(name).color(color(i, label))
        })
        .collect()
}

fn show_bars(ui: &mut Ui, id: &str, y_label: &str, charts: Vec<BarChart>) {
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn as_f64(counts: &[(CellValue, usize)]) -> Vec<(CellValue, f64)> {
    counts.iter().map(|(v, n)| (v.clone(), *n as f64)).collect()
}

/// Distribution of adoption profiles, coloured like the sidebar.
pub fn profile_chart(ui: &mut Ui, metrics: &MetricSet, colors: &ColorMap) {
    ui.strong("Adoption profile distribution");
    let charts = category_bars(&as_f64(&metrics.profile_counts), |_, v| colors.color_for(v));
    show_bars(ui, "profile_chart", "Responses", charts);
}

/// Main fears about GNV.
pub fn fear_chart(ui: &mut Ui, metrics: &MetricSet) {
    ui.strong("Main fears about GNV");
    let palette = generate_palette(metrics.fear_counts.len());
    let charts = category_bars(&as_f64(&metrics.fear_counts), |i, _| palette[i]);
    show_bars(ui, "fear_chart", "Responses", charts);
}

/// Unit types ranked by mean daily consumption.
pub fn unit_chart(ui: &mut Ui, metrics: &MetricSet) {
    ui.strong("Average daily consumption by unit type");
    let Ok(ranking) = &metrics.unit_consumption else {
        ui.weak(super::cards::NO_DATA);
        return;
    };
    let values: Vec<(CellValue, f64)> = ranking
        .iter()
        .map(|GroupStat { group, value, .. }| (group.clone(), *value))
        .collect();
    let palette = generate_palette(values.len());
    let charts = category_bars(&values, |i, _| palette[i]);
    show_bars(ui, "unit_chart", "Liters / day", charts);
}
