use std::collections::{BTreeMap, BTreeSet};

use super::filter::{filter, FilterSpec, FilteredView};
use super::model::{IncidentDataset, IncidentRecord, YearMonth};

// ---------------------------------------------------------------------------
// Aggregate result types
// ---------------------------------------------------------------------------

/// Incident total for one (weapon type, gender) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponGenderTotal {
    pub weapon_type: String,
    pub gender: String,
    pub total: u64,
}

/// Incident total for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub total: u64,
}

/// Incident total for one municipality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalityTotal {
    pub municipality: String,
    pub total: u64,
}

/// Dense municipality × weapon type matrix.
///
/// Rows and columns are the distinct values present in the filtered view,
/// sorted. Every combination has a cell; combinations with no rows hold `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossTable {
    pub municipalities: Vec<String>,
    pub weapon_types: Vec<String>,
    /// `cells[row][col]`, row = municipality, col = weapon type.
    pub cells: Vec<Vec<u64>>,
}

impl CrossTable {
    /// Cell for a (municipality, weapon type) pair, `None` if either label is
    /// not a row/column of the table.
    pub fn get(&self, municipality: &str, weapon_type: &str) -> Option<u64> {
        let r = self.municipalities.iter().position(|m| m == municipality)?;
        let c = self.weapon_types.iter().position(|w| w == weapon_type)?;
        Some(self.cells[r][c])
    }

    /// Largest cell value, `0` for an empty table.
    pub fn max_cell(&self) -> u64 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of every cell.
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.municipalities.len(), self.weapon_types.len())
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty() || self.weapon_types.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Grouped sums over a filtered view
// ---------------------------------------------------------------------------

/// Sum `count` per (weapon type, gender). Pairs without rows are omitted.
pub fn weapon_gender_totals<'a>(
    records: impl IntoIterator<Item = &'a IncidentRecord>,
) -> Vec<WeaponGenderTotal> {
    let mut groups: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for rec in records {
        *groups
            .entry((rec.weapon_type.as_str(), rec.gender.as_str()))
            .or_default() += rec.count;
    }
    groups
        .into_iter()
        .map(|((weapon_type, gender), total)| WeaponGenderTotal {
            weapon_type: weapon_type.to_string(),
            gender: gender.to_string(),
            total,
        })
        .collect()
}

/// Sum `count` per calendar month, ascending. Months without rows are not
/// filled in.
pub fn monthly_totals<'a>(
    records: impl IntoIterator<Item = &'a IncidentRecord>,
) -> Vec<MonthlyTotal> {
    let mut groups: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for rec in records {
        *groups.entry(rec.month()).or_default() += rec.count;
    }
    groups
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// Sum `count` per municipality. Municipalities without rows are omitted.
pub fn municipality_totals<'a>(
    records: impl IntoIterator<Item = &'a IncidentRecord>,
) -> Vec<MunicipalityTotal> {
    let mut groups: BTreeMap<&str, u64> = BTreeMap::new();
    for rec in records {
        *groups.entry(rec.municipality.as_str()).or_default() += rec.count;
    }
    groups
        .into_iter()
        .map(|(municipality, total)| MunicipalityTotal {
            municipality: municipality.to_string(),
            total,
        })
        .collect()
}

/// Pivot `count` into a dense municipality × weapon type table, zero-filled.
pub fn cross_table<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> CrossTable {
    let mut sums: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut rows: BTreeSet<&str> = BTreeSet::new();
    let mut cols: BTreeSet<&str> = BTreeSet::new();

    for rec in records {
        rows.insert(rec.municipality.as_str());
        cols.insert(rec.weapon_type.as_str());
        *sums
            .entry((rec.municipality.as_str(), rec.weapon_type.as_str()))
            .or_default() += rec.count;
    }

    let cells = rows
        .iter()
        .map(|m| {
            cols.iter()
                .map(|w| sums.get(&(*m, *w)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTable {
        municipalities: rows.into_iter().map(str::to_string).collect(),
        weapon_types: cols.into_iter().map(str::to_string).collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// AggregateBundle – everything the dashboard draws for one FilterSpec
// ---------------------------------------------------------------------------

/// The filtered view together with its four aggregate projections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateBundle {
    pub view: FilteredView,
    pub weapon_gender: Vec<WeaponGenderTotal>,
    pub monthly: Vec<MonthlyTotal>,
    pub municipalities: Vec<MunicipalityTotal>,
    pub cross_table: CrossTable,
    /// Sum of `count` over the view.
    pub total_incidents: u64,
}

/// Filter `dataset` with `spec` and derive every aggregate from the result.
pub fn compute(dataset: &IncidentDataset, spec: &FilterSpec) -> AggregateBundle {
    let view = filter(dataset, spec);

    let bundle = AggregateBundle {
        weapon_gender: weapon_gender_totals(view.records(dataset)),
        monthly: monthly_totals(view.records(dataset)),
        municipalities: municipality_totals(view.records(dataset)),
        cross_table: cross_table(view.records(dataset)),
        total_incidents: view.records(dataset).map(|r| r.count).sum(),
        view,
    };

    log::debug!(
        "Recomputed aggregates: {} of {} records, {} incidents, {} months",
        bundle.view.len(),
        dataset.len(),
        bundle.total_incidents,
        bundle.monthly.len()
    );

    bundle
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const CARTAGENA: &str = "CARTAGENA (CT)";
    const MAGANGUE: &str = "MAGANGUÉ";
    const FIREARM: &str = "ARMA DE FUEGO";
    const BLADE: &str = "ARMA BLANCA / CORTOPUNZANTE";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_rows() -> IncidentDataset {
        IncidentDataset::from_records(vec![
            IncidentRecord::new(date(2020, 3, 1), CARTAGENA, FIREARM, "MASCULINO", 3),
            IncidentRecord::new(date(2021, 7, 15), MAGANGUE, BLADE, "FEMENINO", 2),
        ])
    }

    fn full_spec() -> FilterSpec {
        FilterSpec::new((2017, 2024))
            .with_weapon_types([FIREARM, BLADE])
            .with_municipalities([CARTAGENA, MAGANGUE])
    }

    fn larger() -> IncidentDataset {
        IncidentDataset::from_records(vec![
            IncidentRecord::new(date(2018, 1, 3), CARTAGENA, FIREARM, "MASCULINO", 4),
            IncidentRecord::new(date(2018, 1, 20), CARTAGENA, FIREARM, "MASCULINO", 1),
            IncidentRecord::new(date(2018, 4, 9), MAGANGUE, FIREARM, "FEMENINO", 2),
            IncidentRecord::new(date(2019, 11, 30), "TURBACO", BLADE, "MASCULINO", 6),
            IncidentRecord::new(date(2018, 1, 3), CARTAGENA, FIREARM, "MASCULINO", 3),
            IncidentRecord::new(date(2023, 8, 14), MAGANGUE, "CONTUNDENTES", "MASCULINO", 0),
            IncidentRecord::new(date(2024, 2, 1), "TURBACO", FIREARM, "FEMENINO", 5),
        ])
    }

    #[test]
    fn two_row_dataset_with_full_filter() {
        let ds = two_rows();
        let bundle = compute(&ds, &full_spec());

        assert_eq!(bundle.view.len(), 2);
        assert_eq!(
            bundle.weapon_gender,
            vec![
                WeaponGenderTotal {
                    weapon_type: BLADE.to_string(),
                    gender: "FEMENINO".to_string(),
                    total: 2,
                },
                WeaponGenderTotal {
                    weapon_type: FIREARM.to_string(),
                    gender: "MASCULINO".to_string(),
                    total: 3,
                },
            ]
        );
        assert_eq!(
            bundle.monthly,
            vec![
                MonthlyTotal { month: YearMonth::new(2020, 3), total: 3 },
                MonthlyTotal { month: YearMonth::new(2021, 7), total: 2 },
            ]
        );
        assert_eq!(
            bundle.municipalities,
            vec![
                MunicipalityTotal { municipality: CARTAGENA.to_string(), total: 3 },
                MunicipalityTotal { municipality: MAGANGUE.to_string(), total: 2 },
            ]
        );

        let table = &bundle.cross_table;
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.get(CARTAGENA, FIREARM), Some(3));
        assert_eq!(table.get(MAGANGUE, BLADE), Some(2));
        assert_eq!(table.get(CARTAGENA, BLADE), Some(0));
        assert_eq!(table.get(MAGANGUE, FIREARM), Some(0));
        assert_eq!(bundle.total_incidents, 5);
    }

    #[test]
    fn gender_filter_keeps_only_matching_row() {
        let ds = two_rows();
        let spec = full_spec().with_gender(Some("FEMENINO"));
        let bundle = compute(&ds, &spec);

        let rows: Vec<_> = bundle.view.records(&ds).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].municipality, MAGANGUE);

        assert_eq!(bundle.weapon_gender.len(), 1);
        assert_eq!(bundle.weapon_gender[0].total, 2);
        assert_eq!(
            bundle.monthly,
            vec![MonthlyTotal { month: YearMonth::new(2021, 7), total: 2 }]
        );
        assert_eq!(bundle.municipalities.len(), 1);
        assert_eq!(bundle.cross_table.shape(), (1, 1));
        assert_eq!(bundle.cross_table.get(MAGANGUE, BLADE), Some(2));
        assert_eq!(bundle.total_incidents, 2);
    }

    #[test]
    fn years_without_data_give_empty_sparse_and_all_zero_dense() {
        let ds = two_rows();
        let spec = full_spec().with_years(2022, 2024);
        let bundle = compute(&ds, &spec);

        assert!(bundle.view.is_empty());
        assert!(bundle.weapon_gender.is_empty());
        assert!(bundle.monthly.is_empty());
        assert!(bundle.municipalities.is_empty());
        assert!(bundle.cross_table.cells.iter().flatten().all(|&c| c == 0));
        assert_eq!(bundle.cross_table.max_cell(), 0);
        assert_eq!(bundle.total_incidents, 0);
    }

    #[test]
    fn empty_weapon_selection_empties_everything() {
        let ds = two_rows();
        let spec = full_spec()
            .with_weapon_types(Vec::<String>::new())
            .with_gender(Some("MASCULINO"));
        let bundle = compute(&ds, &spec);

        assert!(bundle.view.is_empty());
        assert_eq!(bundle, AggregateBundle::default());
    }

    #[test]
    fn monthly_series_does_not_fill_gaps() {
        let ds = larger();
        let months: Vec<YearMonth> = compute(&ds, &FilterSpec::allow_all(&ds))
            .monthly
            .iter()
            .map(|m| m.month)
            .collect();

        assert_eq!(
            months,
            vec![
                YearMonth::new(2018, 1),
                YearMonth::new(2018, 4),
                YearMonth::new(2019, 11),
                YearMonth::new(2023, 8),
                YearMonth::new(2024, 2),
            ]
        );
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn duplicate_combinations_are_additive() {
        let ds = larger();
        let bundle = compute(&ds, &FilterSpec::allow_all(&ds));

        let jan_2018 = bundle
            .monthly
            .iter()
            .find(|m| m.month == YearMonth::new(2018, 1))
            .unwrap();
        assert_eq!(jan_2018.total, 8);
        assert_eq!(bundle.cross_table.get(CARTAGENA, FIREARM), Some(8));
    }

    #[test]
    fn zero_count_rows_still_form_groups() {
        let ds = larger();
        let bundle = compute(&ds, &FilterSpec::allow_all(&ds));

        assert!(bundle
            .weapon_gender
            .iter()
            .any(|t| t.weapon_type == "CONTUNDENTES" && t.total == 0));
        assert!(bundle
            .monthly
            .iter()
            .any(|m| m.month == YearMonth::new(2023, 8) && m.total == 0));
    }

    #[test]
    fn every_aggregate_conserves_the_view_total() {
        let ds = larger();
        let specs = [
            FilterSpec::allow_all(&ds),
            FilterSpec::allow_all(&ds).with_years(2018, 2019),
            FilterSpec::allow_all(&ds).with_gender(Some("FEMENINO")),
            FilterSpec::allow_all(&ds).with_municipalities([CARTAGENA, "TURBACO"]),
        ];

        for spec in &specs {
            let bundle = compute(&ds, spec);
            let expected: u64 = bundle.view.records(&ds).map(|r| r.count).sum();

            assert_eq!(bundle.total_incidents, expected);
            assert_eq!(bundle.weapon_gender.iter().map(|t| t.total).sum::<u64>(), expected);
            assert_eq!(bundle.monthly.iter().map(|t| t.total).sum::<u64>(), expected);
            assert_eq!(bundle.municipalities.iter().map(|t| t.total).sum::<u64>(), expected);
            assert_eq!(bundle.cross_table.total(), expected);
        }
    }

    #[test]
    fn cross_table_is_dense_over_present_values() {
        let ds = larger();
        let table = compute(&ds, &FilterSpec::allow_all(&ds)).cross_table;

        assert_eq!(table.municipalities, vec![CARTAGENA, MAGANGUE, "TURBACO"]);
        assert_eq!(table.weapon_types, vec![BLADE, FIREARM, "CONTUNDENTES"]);
        assert!(table.cells.iter().all(|row| row.len() == 3));
        assert_eq!(table.get("TURBACO", "CONTUNDENTES"), Some(0));
        assert_eq!(table.get("TURBACO", BLADE), Some(6));
        assert_eq!(table.get("ARJONA", FIREARM), None);
        assert_eq!(table.max_cell(), 8);
    }
}
