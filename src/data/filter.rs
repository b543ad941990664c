use std::collections::BTreeSet;

use super::catalog::{DEFAULT_MUNICIPALITIES, DEFAULT_WEAPON_TYPES, DEFAULT_YEAR_RANGE};
use super::model::{IncidentDataset, IncidentRecord};

// ---------------------------------------------------------------------------
// FilterSpec – the user's current constraints
// ---------------------------------------------------------------------------

/// Constraints applied to the dataset. All four are combined with AND.
///
/// * `year_range` is inclusive on both ends; an inverted range matches nothing.
/// * An empty `weapon_types` or `municipalities` set matches nothing.
/// * `gender == None` disables gender filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub year_range: (i32, i32),
    pub weapon_types: BTreeSet<String>,
    pub municipalities: BTreeSet<String>,
    pub gender: Option<String>,
}

impl FilterSpec {
    /// A spec over `year_range` with nothing else selected yet.
    pub fn new(year_range: (i32, i32)) -> Self {
        Self {
            year_range,
            weapon_types: BTreeSet::new(),
            municipalities: BTreeSet::new(),
            gender: None,
        }
    }

    /// A spec that lets every row of `dataset` through.
    pub fn allow_all(dataset: &IncidentDataset) -> Self {
        Self {
            year_range: dataset.year_bounds().unwrap_or(DEFAULT_YEAR_RANGE),
            weapon_types: dataset.weapon_types().clone(),
            municipalities: dataset.municipalities().clone(),
            gender: None,
        }
    }

    /// The initial selection shown when `dataset` is opened: the full year
    /// range, the catalog's default weapons and municipalities, both genders.
    ///
    /// Defaults the dataset does not contain are dropped; a column left with
    /// nothing selected falls back to every value present.
    pub fn defaults_for(dataset: &IncidentDataset) -> Self {
        let pick = |defaults: &[&str], present: &BTreeSet<String>| {
            let chosen: BTreeSet<String> = defaults
                .iter()
                .filter(|d| present.contains(**d))
                .map(|d| d.to_string())
                .collect();
            if chosen.is_empty() {
                present.clone()
            } else {
                chosen
            }
        };

        Self {
            year_range: dataset.year_bounds().unwrap_or(DEFAULT_YEAR_RANGE),
            weapon_types: pick(&DEFAULT_WEAPON_TYPES, dataset.weapon_types()),
            municipalities: pick(&DEFAULT_MUNICIPALITIES, dataset.municipalities()),
            gender: None,
        }
    }

    pub fn with_years(mut self, min_year: i32, max_year: i32) -> Self {
        self.year_range = (min_year, max_year);
        self
    }

    pub fn with_weapon_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.weapon_types = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_municipalities<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.municipalities = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_gender(mut self, gender: Option<&str>) -> Self {
        self.gender = gender.map(str::to_string);
        self
    }

    /// Whether a single record passes every constraint.
    pub fn matches(&self, record: &IncidentRecord) -> bool {
        let (min_year, max_year) = self.year_range;
        let year = record.year();

        (min_year..=max_year).contains(&year)
            && self.weapon_types.contains(&record.weapon_type)
            && self.municipalities.contains(&record.municipality)
            && self.gender.as_ref().map_or(true, |g| *g == record.gender)
    }

    /// Selected values that no record of `dataset` carries, as
    /// `(column, value)` pairs. Such values are legal but can never match.
    pub fn unknown_values(&self, dataset: &IncidentDataset) -> Vec<(&'static str, String)> {
        let mut unknown = Vec::new();
        for w in &self.weapon_types {
            if !dataset.weapon_types().contains(w) {
                unknown.push(("weapon_type", w.clone()));
            }
        }
        for m in &self.municipalities {
            if !dataset.municipalities().contains(m) {
                unknown.push(("municipality", m.clone()));
            }
        }
        if let Some(g) = &self.gender {
            if !dataset.genders().contains(g) {
                unknown.push(("gender", g.clone()));
            }
        }
        unknown
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec::new(DEFAULT_YEAR_RANGE)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – positions of the rows passing a FilterSpec
// ---------------------------------------------------------------------------

/// The records of a dataset that passed a filter, kept as row positions in
/// dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate the retained records, in dataset order.
    pub fn records<'a>(
        &'a self,
        dataset: &'a IncidentDataset,
    ) -> impl Iterator<Item = &'a IncidentRecord> + 'a {
        self.indices.iter().filter_map(move |&i| dataset.get(i))
    }

    /// Copy the retained records into a standalone dataset.
    pub fn to_dataset(&self, dataset: &IncidentDataset) -> IncidentDataset {
        IncidentDataset::from_records(self.records(dataset).cloned().collect())
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no record passed.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(dataset: &IncidentDataset, spec: &FilterSpec) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| spec.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `spec` to `dataset`.
pub fn filter(dataset: &IncidentDataset, spec: &FilterSpec) -> FilteredView {
    FilteredView {
        indices: filtered_indices(dataset, spec),
    }
}
