use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::color::ColorMap;
use crate::data::aggregate::{compute, AggregateBundle};
use crate::data::catalog::{options_with_extras, GENDERS, MUNICIPALITIES, WEAPON_TYPES};
use crate::data::export::export_csv_file;
use crate::data::filter::FilterSpec;
use crate::data::model::IncidentDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which multi-select control a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    WeaponType,
    Municipality,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded), shared read-only.
    pub dataset: Option<Arc<IncidentDataset>>,

    /// Current filter selections.
    pub filters: FilterSpec,

    /// Filtered view and aggregates for `filters` (cached).
    pub bundle: AggregateBundle,

    /// Options listed by the weapon / municipality / gender controls.
    pub weapon_options: Vec<String>,
    pub municipality_options: Vec<String>,
    pub gender_options: Vec<String>,

    /// Colours for the gender series and the municipality slices.
    pub gender_colors: Option<ColorMap>,
    pub municipality_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// State with `dataset` already ingested.
    pub fn with_dataset(dataset: IncidentDataset) -> Self {
        let mut state = Self::default();
        state.set_dataset(dataset);
        state
    }

    /// Ingest a newly loaded dataset, initialise filters, options and colours.
    pub fn set_dataset(&mut self, dataset: IncidentDataset) {
        self.filters = FilterSpec::defaults_for(&dataset);

        self.weapon_options = options_with_extras(&WEAPON_TYPES, dataset.weapon_types());
        self.municipality_options =
            options_with_extras(&MUNICIPALITIES, dataset.municipalities());
        self.gender_options = options_with_extras(&GENDERS, dataset.genders());

        self.gender_colors = Some(ColorMap::new(&self.gender_options));
        self.municipality_colors = Some(ColorMap::new(&self.municipality_options));

        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.refilter();
    }

    /// Load `path`, replacing the current dataset on success. On failure the
    /// previous dataset is kept and the error is shown in the status bar.
    pub fn open_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records ({} incidents) from {}",
                    dataset.len(),
                    dataset.total_count(),
                    path.display()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the filtered view and aggregates after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        for (column, value) in self.filters.unknown_values(ds) {
            log::debug!("Filter value {value:?} for {column} matches no record");
        }
        self.bundle = compute(ds, &self.filters);
    }

    /// Year bounds offered by the range control.
    pub fn year_bounds(&self) -> (i32, i32) {
        self.dataset
            .as_ref()
            .and_then(|ds| ds.year_bounds())
            .unwrap_or(crate::data::catalog::DEFAULT_YEAR_RANGE)
    }

    /// Set the inclusive year range.
    pub fn set_year_range(&mut self, min_year: i32, max_year: i32) {
        if self.filters.year_range != (min_year, max_year) {
            self.filters.year_range = (min_year, max_year);
            self.refilter();
        }
    }

    fn selection_mut(&mut self, which: Selection) -> &mut BTreeSet<String> {
        match which {
            Selection::WeaponType => &mut self.filters.weapon_types,
            Selection::Municipality => &mut self.filters.municipalities,
        }
    }

    fn options(&self, which: Selection) -> &[String] {
        match which {
            Selection::WeaponType => &self.weapon_options,
            Selection::Municipality => &self.municipality_options,
        }
    }

    /// Toggle a single value in a multi-select.
    pub fn toggle(&mut self, which: Selection, value: &str) {
        let selected = self.selection_mut(which);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every option of a multi-select.
    pub fn select_all(&mut self, which: Selection) {
        let all: BTreeSet<String> = self.options(which).iter().cloned().collect();
        *self.selection_mut(which) = all;
        self.refilter();
    }

    /// Deselect every option of a multi-select.
    pub fn select_none(&mut self, which: Selection) {
        self.selection_mut(which).clear();
        self.refilter();
    }

    /// Restrict to one gender, or `None` for both.
    pub fn set_gender(&mut self, gender: Option<String>) {
        if self.filters.gender != gender {
            self.filters.gender = gender;
            self.refilter();
        }
    }

    /// Write the current filtered view to `path` as CSV.
    pub fn export_filtered(&self, path: &Path) -> Result<usize> {
        let Some(ds) = &self.dataset else {
            anyhow::bail!("no dataset loaded");
        };
        export_csv_file(path, ds, &self.bundle.view)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::IncidentRecord;

    fn dataset() -> IncidentDataset {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        IncidentDataset::from_records(vec![
            IncidentRecord::new(d(2017, 2, 1), "CARTAGENA (CT)", "ARMA DE FUEGO", "MASCULINO", 4),
            IncidentRecord::new(d(2019, 5, 6), "TURBACO", "CONTUNDENTES", "FEMENINO", 1),
            IncidentRecord::new(d(2022, 8, 9), "ARJONA", "ARMA DE FUEGO", "MASCULINO", 2),
            IncidentRecord::new(d(2024, 1, 1), "MAGANGUÉ", "ALMOHADA", "FEMENINO", 1),
        ])
    }

    #[test]
    fn new_dataset_starts_from_catalog_defaults() {
        let state = AppState::with_dataset(dataset());

        assert_eq!(state.filters.year_range, (2017, 2024));
        // ARJONA is not a default municipality, ALMOHADA not a default weapon.
        assert_eq!(state.bundle.view.indices(), &[0, 1]);
        assert_eq!(state.bundle.total_incidents, 5);
        assert_eq!(state.weapon_options.len(), WEAPON_TYPES.len());
        assert_eq!(state.gender_options, vec!["MASCULINO", "FEMENINO"]);
    }

    #[test]
    fn controls_recompute_the_bundle() {
        let mut state = AppState::with_dataset(dataset());

        state.select_all(Selection::Municipality);
        assert_eq!(state.bundle.view.indices(), &[0, 1, 2]);

        state.toggle(Selection::WeaponType, "ALMOHADA");
        assert_eq!(state.bundle.view.len(), 4);

        state.set_gender(Some("FEMENINO".to_string()));
        assert_eq!(state.bundle.view.indices(), &[1, 3]);

        state.set_year_range(2020, 2024);
        assert_eq!(state.bundle.view.indices(), &[3]);

        state.select_none(Selection::WeaponType);
        assert!(state.bundle.view.is_empty());
        assert!(state.bundle.monthly.is_empty());
    }

    #[test]
    fn failed_open_keeps_previous_dataset() {
        let mut state = AppState::with_dataset(dataset());
        let dir = tempfile::tempdir().unwrap();

        state.open_path(&dir.path().join("missing.parquet"));

        assert!(state.status_message.is_some());
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(4));
    }

    #[test]
    fn export_without_dataset_fails() {
        let state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        assert!(state.export_filtered(&dir.path().join("out.csv")).is_err());
    }
}
