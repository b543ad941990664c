use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 6] = ["#", "Fecha", "Municipio", "Arma / medio", "Género", "Cantidad"];

/// Render the filtered records, in dataset order.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Datos filtrados");

    let Some(ds) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let view = &state.bundle.view;
    if view.is_empty() {
        ui.weak("Ningún registro coincide con los filtros.");
        return;
    }

    let available = ui.available_height();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::initial(180.0))
        .column(Column::initial(260.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .min_scrolled_height(0.0)
        .max_scroll_height(available)
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let idx = view.indices()[row.index()];
                let Some(rec) = ds.get(idx) else {
                    return;
                };
                row.col(|ui: &mut Ui| {
                    ui.label(idx.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.date.format("%Y-%m-%d").to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.municipality.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.weapon_type.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.gender.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.count.to_string());
                });
            });
        });
}
