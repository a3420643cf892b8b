use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// The filtered records, one row each, columns in file order.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    let columns = &state.dataset.column_names;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(360.0)
        .columns(Column::auto().at_least(70.0).clip(true), columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for col in columns {
                header.col(|ui| {
                    ui.label(RichText::new(col).strong());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                let record = &state.dataset.records[state.visible_indices[row.index()]];
                for col in columns {
                    row.col(|ui| {
                        let text = record
                            .value(col)
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        ui.label(text);
                    });
                }
            });
        });
}
