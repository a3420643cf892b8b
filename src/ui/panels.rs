use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::is_unrestricted;
use crate::state::AppState;
use crate::ui::{cards, plot, table};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let columns = state.filter_columns();
    let dataset = state.dataset.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let Some(all_values) = dataset.unique_values.get(col) else {
                    continue;
                };

                let n_selected = state.selection.get(col).map_or(0, |s| s.len());
                let n_total = all_values.len();
                let header_text = if n_selected == 0 {
                    format!("{col}  (all)")
                } else {
                    format!("{col}  ({n_selected}/{n_total})")
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("Clear").clicked() {
                                state.clear(col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .selection
                                .get(col)
                                .is_some_and(|s| s.contains(val));

                            let mut text = RichText::new(val.to_string());
                            if state.profile_colors.column == *col {
                                text = text.color(state.profile_colors.color_for(val));
                            }

                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export CSV…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} responses loaded, {} matching",
            state.dataset.len(),
            state.visible_indices.len()
        ));
        if is_unrestricted(&state.selection) {
            ui.weak("(no filters)");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Export failed") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – cards, insights, charts, table
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("ZAGAZ · GNV Strategic Dashboard");
            ui.label("Segments, adoption, fears and opportunities.");

            if state.visible_indices.is_empty() {
                ui.add_space(40.0);
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.heading("No matching records");
                    ui.label("Widen or clear the filters on the left.");
                });
                return;
            }

            cards::section_title(ui, "Key indicators");
            cards::card_grid(ui, &cards::summary_cards(&state.metrics, &state.config));

            cards::section_title(ui, "Strategic insights");
            cards::insight_list(ui, &state.insights);

            cards::section_title(ui, "Charts");
            plot::profile_chart(ui, &state.metrics, &state.profile_colors);
            plot::fear_chart(ui, &state.metrics);
            plot::unit_chart(ui, &state.metrics);

            cards::section_title(ui, "Filtered table");
            table::filtered_table(ui, state);
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered responses")
        .set_file_name("filtered_survey.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_visible(&path);
    }
}
