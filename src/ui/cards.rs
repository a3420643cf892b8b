use eframe::egui::{self, RichText, Ui};

use crate::color::{ACCENT, CAPTION, CARD_FILL, INSIGHT, INSIGHT_FILL};
use crate::config::DashboardConfig;
use crate::data::metrics::{Metric, MetricSet};

/// Shown in place of any unavailable value.
pub const NO_DATA: &str = "no data";

/// One summary card: a headline value with a short caption.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub value: String,
    pub caption: String,
}

fn card(metric: &Metric<f64>, unit: &str, decimals: usize, caption: &str) -> Card {
    let value = match metric {
        Ok(v) => format!("{v:.decimals$}{unit}"),
        Err(_) => NO_DATA.to_string(),
    };
    Card {
        value,
        caption: caption.to_string(),
    }
}

/// Group digits in thousands: 18500 → "18,500".
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Summary cards for the current subset, followed by the two configured
/// market-sizing figures.
pub fn summary_cards(metrics: &MetricSet, config: &DashboardConfig) -> Vec<Card> {
    vec![
        Card {
            value: thousands(metrics.record_count as u64),
            caption: "Matching responses".into(),
        },
        card(&metrics.mean_consumption, " L", 1, "Average daily consumption"),
        card(&metrics.knowledge_pct, "%", 1, "Know about GNV"),
        card(&metrics.willingness_pct, "%", 1, "Willing to convert"),
        card(&metrics.visionary_pct, "%", 1, "Visionaries detected"),
        card(&metrics.mean_vehicle_year, "", 0, "Average vehicle year"),
        Card {
            value: thousands(config.market_units),
            caption: "Units in the market (estimate)".into(),
        },
        Card {
            value: format!("{} L", thousands(config.market_daily_liters.max(0.0).round() as u64)),
            caption: "Daily market demand (estimate)".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const CARDS_PER_ROW: usize = 4;

pub fn card_grid(ui: &mut Ui, cards: &[Card]) {
    for row in cards.chunks(CARDS_PER_ROW) {
        ui.columns(CARDS_PER_ROW, |cols| {
            for (col, c) in cols.iter_mut().zip(row) {
                egui::Frame::new()
                    .fill(CARD_FILL)
                    .stroke(egui::Stroke::new(2.0, ACCENT))
                    .corner_radius(12.0)
                    .inner_margin(egui::Margin::same(14))
                    .show(col, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.label(RichText::new(&c.value).size(28.0).strong().color(egui::Color32::WHITE));
                        ui.label(RichText::new(&c.caption).size(13.0).color(CAPTION));
                    });
            }
        });
        ui.add_space(8.0);
    }
}

pub fn insight_list(ui: &mut Ui, insights: &[String]) {
    for text in insights {
        egui::Frame::new()
            .fill(INSIGHT_FILL)
            .stroke(egui::Stroke::new(1.0, INSIGHT))
            .corner_radius(12.0)
            .inner_margin(egui::Margin::same(14))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(text).size(15.0));
            });
        ui.add_space(6.0);
    }
}

pub fn section_title(ui: &mut Ui, title: &str) {
    ui.add_space(16.0);
    ui.label(RichText::new(title).size(22.0).strong().color(ACCENT));
    ui.add_space(6.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metrics::compute;
    use crate::data::metrics::tests::survey;

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(18_500), "18,500");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn cards_format_available_metrics() {
        let records = survey();
        let refs: Vec<_> = records.iter().collect();
        let cards = summary_cards(&compute(&refs), &DashboardConfig::default());

        assert_eq!(cards.len(), 8);
        assert_eq!(cards[0].value, "4");
        assert_eq!(cards[1].value, "37.5 L");
        assert_eq!(cards[3].value, "75.0%");
        assert_eq!(cards[6].value, "18,500");
        assert_eq!(cards[7].value, "740,000 L");
    }

    #[test]
    fn unavailable_metrics_render_no_data() {
        let cards = summary_cards(&compute(&[]), &DashboardConfig::default());
        assert_eq!(cards[0].value, "0");
        assert!(cards[1..6].iter().all(|c| c.value == NO_DATA));
        // Market figures are configuration, not data.
        assert_eq!(cards[6].value, "18,500");
    }
}
