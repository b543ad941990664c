use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::catalog::BOTH_GENDERS_LABEL;
use crate::state::{AppState, Selection};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            year_range(ui, state);
            ui.separator();

            multi_select(ui, state, Selection::WeaponType, "Tipo de arma");
            multi_select(ui, state, Selection::Municipality, "Municipio");
            ui.separator();

            gender_select(ui, state);
        });
}

fn year_range(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Rango de años");

    let (lo, hi) = state.year_bounds();
    let (mut from, mut to) = state.filters.year_range;

    ui.add(egui::Slider::new(&mut from, lo..=hi).text("desde"));
    ui.add(egui::Slider::new(&mut to, lo..=hi).text("hasta"));

    // Dragging one handle past the other drags the other along.
    if from != state.filters.year_range.0 && from > to {
        to = from;
    } else if to != state.filters.year_range.1 && to < from {
        from = to;
    }
    state.set_year_range(from, to);
}

fn multi_select(ui: &mut Ui, state: &mut AppState, which: Selection, title: &str) {
    let options = match which {
        Selection::WeaponType => state.weapon_options.clone(),
        Selection::Municipality => state.municipality_options.clone(),
    };
    let n_selected = options
        .iter()
        .filter(|o| selected(state, which).contains(*o))
        .count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(which == Selection::WeaponType)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("Todos").clicked() {
                    state.select_all(which);
                }
                if ui.small_button("Ninguno").clicked() {
                    state.select_none(which);
                }
            });

            for option in &options {
                let mut checked = selected(state, which).contains(option);
                if ui.checkbox(&mut checked, option.as_str()).changed() {
                    state.toggle(which, option);
                }
            }
        });
}

fn selected(state: &AppState, which: Selection) -> &std::collections::BTreeSet<String> {
    match which {
        Selection::WeaponType => &state.filters.weapon_types,
        Selection::Municipality => &state.filters.municipalities,
    }
}

fn gender_select(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Género");

    let current = state.filters.gender.clone();
    let label = current.as_deref().unwrap_or(BOTH_GENDERS_LABEL).to_string();
    let mut chosen = current.clone();

    egui::ComboBox::from_id_salt("gender")
        .selected_text(label)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut chosen, None, BOTH_GENDERS_LABEL);
            for g in &state.gender_options {
                ui.selectable_value(&mut chosen, Some(g.clone()), g.as_str());
            }
        });

    if chosen != current {
        state.set_gender(chosen);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible, {} incidents",
                ds.len(),
                state.bundle.view.len(),
                state.bundle.total_incidents
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open incident data")
        .add_filter("Supported files", &["parquet", "pq", "csv", "json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered records")
        .set_file_name("incidentes_filtrados.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_filtered(&path) {
            Ok(_) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
