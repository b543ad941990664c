use eframe::egui;

use crate::data::model::IncidentDataset;
use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct IncidentExplorerApp {
    pub state: AppState,
}

impl IncidentExplorerApp {
    pub fn new(dataset: IncidentDataset) -> Self {
        Self {
            state: AppState::with_dataset(dataset),
        }
    }
}

impl eframe::App for IncidentExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: filtered records ----
        egui::TopBottomPanel::bottom("data_table")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                table::filtered_table(ui, &self.state);
            });

        // ---- Central panel: 2 × 2 charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
