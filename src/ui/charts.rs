use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

use eframe::egui::{
    pos2, vec2, Align2, Color32, FontId, Rect, ScrollArea, Sense, Shape, Stroke, Ui,
};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{heat_color, text_color_on};
use crate::data::aggregate::{CrossTable, MonthlyTotal, MunicipalityTotal};
use crate::data::model::YearMonth;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: 2 × 2 grid of charts
// ---------------------------------------------------------------------------

/// Render the four aggregate charts in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore incidents  (File → Open…)");
        });
        return;
    }

    intro(ui);

    // Heading + spacing per row.
    let chart_height = ((ui.available_height() - 90.0) / 2.0).max(160.0);

    ui.columns(2, |cols: &mut [Ui]| {
        weapon_gender_bars(&mut cols[0], state, chart_height);
        monthly_line(&mut cols[1], &state.bundle.monthly, chart_height);
    });
    ui.separator();
    ui.columns(2, |cols: &mut [Ui]| {
        municipality_pie(&mut cols[0], state, &state.bundle.municipalities, chart_height);
        cross_table_heatmap(&mut cols[1], &state.bundle.cross_table, chart_height);
    });
}

const TITLE: &str = "Análisis de Homicidios en el Departamento de Bolívar";
const INTRO: &str = "Homicidios ocurridos en el departamento de Bolívar, Colombia, \
    entre 2017 y 2024: cantidad de incidentes por municipio, tipo de arma empleada \
    y su evolución en el tiempo.";

fn intro(ui: &mut Ui) {
    ui.heading(TITLE);
    ui.label(INTRO);
    ui.separator();
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

fn no_data(ui: &mut Ui, height: f32) {
    ui.allocate_ui(vec2(ui.available_width(), height), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.weak("Sin datos para los filtros seleccionados");
        });
    });
}

// ---------------------------------------------------------------------------
// Grouped bars: weapon type × gender
// ---------------------------------------------------------------------------

fn weapon_gender_bars(ui: &mut Ui, state: &AppState, height: f32) {
    ui.heading("Número de incidentes por tipo de arma y género");

    let totals = &state.bundle.weapon_gender;
    if totals.is_empty() {
        no_data(ui, height);
        return;
    }

    let weapons: Vec<String> = totals
        .iter()
        .map(|t| t.weapon_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let genders: BTreeSet<&str> = totals.iter().map(|t| t.gender.as_str()).collect();

    let group_width = 0.8;
    let bar_width = group_width / genders.len() as f64;

    let mut charts = Vec::with_capacity(genders.len());
    let mut labels = Vec::with_capacity(totals.len());

    for (gi, gender) in genders.iter().enumerate() {
        let color = state
            .gender_colors
            .as_ref()
            .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(gender));

        let bars: Vec<Bar> = totals
            .iter()
            .filter(|t| t.gender == *gender)
            .filter_map(|t| {
                let wi = weapons.iter().position(|w| *w == t.weapon_type)?;
                let x = wi as f64 - group_width / 2.0 + bar_width * (gi as f64 + 0.5);
                labels.push((x, t.total));
                Some(
                    Bar::new(x, t.total as f64)
                        .width(bar_width * 0.95)
                        .name(format!("{} · {gender}", t.weapon_type)),
                )
            })
            .collect();

        charts.push(BarChart::new(bars).name(*gender).color(color));
    }

    let axis_labels = weapons.clone();
    Plot::new("weapon_gender_plot")
        .height(height)
        .legend(Legend::default())
        .allow_scroll(false)
        .y_axis_label("Cantidad")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            axis_labels
                .get(idx as usize)
                .map(|w| truncate(w, 16))
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
            for (x, total) in labels {
                plot_ui.text(
                    Text::new(PlotPoint::new(x, total as f64), total.to_string())
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Monthly time series
// ---------------------------------------------------------------------------

fn monthly_line(ui: &mut Ui, monthly: &[MonthlyTotal], height: f32) {
    ui.heading("Evolución de los incidentes a lo largo del tiempo");

    if monthly.is_empty() {
        no_data(ui, height);
        return;
    }

    let points: Vec<[f64; 2]> = monthly
        .iter()
        .map(|m| [m.month.ordinal() as f64, m.total as f64])
        .collect();

    Plot::new("monthly_plot")
        .height(height)
        .allow_scroll(false)
        .y_axis_label("Cantidad")
        .x_axis_formatter(|mark, _range| {
            let ordinal = mark.value.round();
            if (mark.value - ordinal).abs() > 1e-6 {
                return String::new();
            }
            YearMonth::from_ordinal(ordinal as i64).to_string()
        })
        .label_formatter(|_name, value| {
            let month = YearMonth::from_ordinal(value.x.round() as i64);
            format!("{month}\n{:.0} incidentes", value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Incidentes")
                    .color(Color32::from_rgb(31, 119, 180))
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(Color32::from_rgb(31, 119, 180))
                    .radius(2.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Pie: share of incidents per municipality
// ---------------------------------------------------------------------------

fn municipality_pie(ui: &mut Ui, state: &AppState, totals: &[MunicipalityTotal], height: f32) {
    ui.heading("Distribución de incidentes por municipio");

    let grand_total: u64 = totals.iter().map(|t| t.total).sum();
    if grand_total == 0 {
        no_data(ui, height);
        return;
    }

    let color_of = |name: &str| {
        state
            .municipality_colors
            .as_ref()
            .map_or(Color32::GRAY, |cm| cm.color_for(name))
    };

    ui.horizontal(|ui: &mut Ui| {
        let diameter = height.min(ui.available_width() * 0.6);
        let (response, painter) = ui.allocate_painter(vec2(diameter, diameter), Sense::hover());
        let center = response.rect.center();
        let radius = diameter / 2.0 - 4.0;

        let mut start = -PI / 2.0;
        for t in totals {
            let fraction = t.total as f32 / grand_total as f32;
            let sweep = fraction * TAU;
            let color = color_of(&t.municipality);

            // Triangle fan; each piece is convex even when the slice is not.
            let steps = ((sweep / 0.05).ceil() as usize).max(1);
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![
                        center,
                        center + radius * vec2(a0.cos(), a0.sin()),
                        center + radius * vec2(a1.cos(), a1.sin()),
                    ],
                    color,
                    Stroke::NONE,
                ));
            }

            if fraction >= 0.04 {
                let mid = start + sweep / 2.0;
                painter.text(
                    center + radius * 0.65 * vec2(mid.cos(), mid.sin()),
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", fraction * 100.0),
                    FontId::proportional(12.0),
                    text_color_on(color),
                );
            }
            start += sweep;
        }

        // Legend
        ui.vertical(|ui: &mut Ui| {
            ScrollArea::vertical()
                .id_salt("pie_legend")
                .max_height(height)
                .show(ui, |ui: &mut Ui| {
                    for t in totals {
                        ui.horizontal(|ui: &mut Ui| {
                            let (swatch, _) =
                                ui.allocate_exact_size(vec2(10.0, 10.0), Sense::hover());
                            ui.painter().rect_filled(swatch, 2.0, color_of(&t.municipality));
                            ui.label(format!("{} ({})", t.municipality, t.total));
                        });
                    }
                });
        });
    });
}

// ---------------------------------------------------------------------------
// Heatmap: municipality × weapon type
// ---------------------------------------------------------------------------

const ROW_LABEL_WIDTH: f32 = 150.0;
const HEADER_HEIGHT: f32 = 36.0;
const CELL_HEIGHT: f32 = 24.0;

fn cross_table_heatmap(ui: &mut Ui, table: &CrossTable, height: f32) {
    ui.heading("Relación entre municipios y tipos de armas");

    if table.is_empty() {
        no_data(ui, height);
        return;
    }

    let (n_rows, n_cols) = table.shape();
    let max = table.max_cell().max(1) as f32;

    ScrollArea::vertical()
        .id_salt("heatmap")
        .max_height(height)
        .show(ui, |ui: &mut Ui| {
            let width = ui.available_width().max(ROW_LABEL_WIDTH + 60.0);
            let total_height = HEADER_HEIGHT + CELL_HEIGHT * n_rows as f32;
            let (response, painter) =
                ui.allocate_painter(vec2(width, total_height), Sense::hover());
            let origin = response.rect.min;
            let cell_width = (width - ROW_LABEL_WIDTH) / n_cols as f32;
            let label_font = FontId::proportional(11.0);
            let label_color = ui.visuals().text_color();

            for (c, weapon) in table.weapon_types.iter().enumerate() {
                let x = origin.x + ROW_LABEL_WIDTH + cell_width * (c as f32 + 0.5);
                painter.text(
                    pos2(x, origin.y + HEADER_HEIGHT / 2.0),
                    Align2::CENTER_CENTER,
                    truncate(weapon, (cell_width / 7.0) as usize),
                    label_font.clone(),
                    label_color,
                );
            }

            for (r, municipality) in table.municipalities.iter().enumerate() {
                let y = origin.y + HEADER_HEIGHT + CELL_HEIGHT * r as f32;
                painter.text(
                    pos2(origin.x + ROW_LABEL_WIDTH - 6.0, y + CELL_HEIGHT / 2.0),
                    Align2::RIGHT_CENTER,
                    truncate(municipality, 22),
                    label_font.clone(),
                    label_color,
                );

                for (c, &value) in table.cells[r].iter().enumerate() {
                    let rect = Rect::from_min_size(
                        pos2(origin.x + ROW_LABEL_WIDTH + cell_width * c as f32, y),
                        vec2(cell_width, CELL_HEIGHT),
                    )
                    .shrink(1.0);
                    let fill = heat_color(value as f32 / max);
                    painter.rect_filled(rect, 0.0, fill);
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        value.to_string(),
                        label_font.clone(),
                        text_color_on(fill),
                    );
                }
            }

            if let Some(pos) = response.hover_pos() {
                let col = ((pos.x - origin.x - ROW_LABEL_WIDTH) / cell_width).floor();
                let row = ((pos.y - origin.y - HEADER_HEIGHT) / CELL_HEIGHT).floor();
                if col >= 0.0 && row >= 0.0 && (col as usize) < n_cols && (row as usize) < n_rows
                {
                    let (r, c) = (row as usize, col as usize);
                    response.on_hover_text(format!(
                        "{} · {}: {}",
                        table.municipalities[r], table.weapon_types[c], table.cells[r][c]
                    ));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::{truncate, INTRO, TITLE};

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("MAGANGUÉ", 20), "MAGANGUÉ");
        assert_eq!(truncate("EL CARMEN DE BOLÍVAR", 12), "EL CARMEN D…");
        assert_eq!(truncate("ÁÉÍ", 2), "Á…");
    }

    #[test]
    fn intro_describes_the_dataset() {
        assert!(TITLE.contains("Bolívar"));
        assert!(INTRO.contains("2017") && INTRO.contains("2024"));
        assert!(!INTRO.contains("  "));
    }
}
