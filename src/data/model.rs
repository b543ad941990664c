use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// YearMonth – a date truncated to month granularity
// ---------------------------------------------------------------------------

/// Calendar month used as the time-series bucket.
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months elapsed since January of year 0, handy as a plot axis.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Inverse of [`YearMonth::ordinal`].
    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// IncidentRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One pre-aggregated row: `count` incidents sharing date, municipality,
/// weapon type and gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentRecord {
    #[serde(rename = "FECHA HECHO")]
    pub date: NaiveDate,
    #[serde(rename = "MUNICIPIO")]
    pub municipality: String,
    #[serde(rename = "ARMA MEDIO")]
    pub weapon_type: String,
    #[serde(rename = "GENERO")]
    pub gender: String,
    #[serde(rename = "CANTIDAD")]
    pub count: u64,
}

impl IncidentRecord {
    pub fn new(
        date: NaiveDate,
        municipality: impl Into<String>,
        weapon_type: impl Into<String>,
        gender: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            date,
            municipality: municipality.into(),
            weapon_type: weapon_type.into(),
            gender: gender.into(),
            count,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

// ---------------------------------------------------------------------------
// IncidentDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct IncidentDataset {
    /// All records, in file order.
    records: Vec<IncidentRecord>,
    /// Sorted distinct values of each categorical column.
    municipalities: BTreeSet<String>,
    weapon_types: BTreeSet<String>,
    genders: BTreeSet<String>,
    /// Smallest and largest year present, `None` for an empty table.
    year_bounds: Option<(i32, i32)>,
}

impl IncidentDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<IncidentRecord>) -> Self {
        let mut municipalities = BTreeSet::new();
        let mut weapon_types = BTreeSet::new();
        let mut genders = BTreeSet::new();
        let mut year_bounds: Option<(i32, i32)> = None;

        for rec in &records {
            municipalities.insert(rec.municipality.clone());
            weapon_types.insert(rec.weapon_type.clone());
            genders.insert(rec.gender.clone());

            let y = rec.year();
            year_bounds = Some(match year_bounds {
                Some((lo, hi)) => (lo.min(y), hi.max(y)),
                None => (y, y),
            });
        }

        IncidentDataset {
            records,
            municipalities,
            weapon_types,
            genders,
            year_bounds,
        }
    }

    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&IncidentRecord> {
        self.records.get(index)
    }

    pub fn municipalities(&self) -> &BTreeSet<String> {
        &self.municipalities
    }

    pub fn weapon_types(&self) -> &BTreeSet<String> {
        &self.weapon_types
    }

    pub fn genders(&self) -> &BTreeSet<String> {
        &self.genders
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }

    /// Sum of `count` over every record.
    pub fn total_count(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn year_month_orders_chronologically() {
        let mut months = vec![
            YearMonth::new(2021, 1),
            YearMonth::new(2020, 12),
            YearMonth::new(2020, 3),
        ];
        months.sort();
        assert_eq!(
            months,
            vec![
                YearMonth::new(2020, 3),
                YearMonth::new(2020, 12),
                YearMonth::new(2021, 1)
            ]
        );
        assert_eq!(YearMonth::new(2020, 3).to_string(), "2020-03");
    }

    #[test]
    fn ordinal_round_trips_across_year_boundaries() {
        for ym in [YearMonth::new(2019, 12), YearMonth::new(2020, 1)] {
            assert_eq!(YearMonth::from_ordinal(ym.ordinal()), ym);
        }
        assert_eq!(
            YearMonth::new(2020, 1).ordinal() - YearMonth::new(2019, 12).ordinal(),
            1
        );
    }

    #[test]
    fn dataset_indexes_distinct_values_and_year_bounds() {
        let ds = IncidentDataset::from_records(vec![
            IncidentRecord::new(date(2018, 5, 2), "ARJONA", "ARMA DE FUEGO", "MASCULINO", 1),
            IncidentRecord::new(date(2023, 1, 9), "TURBACO", "CONTUNDENTES", "FEMENINO", 4),
            IncidentRecord::new(date(2020, 7, 30), "ARJONA", "ARMA DE FUEGO", "MASCULINO", 2),
        ]);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.year_bounds(), Some((2018, 2023)));
        assert_eq!(ds.municipalities().len(), 2);
        assert_eq!(ds.weapon_types().len(), 2);
        assert_eq!(ds.genders().len(), 2);
        assert_eq!(ds.total_count(), 7);
    }

    #[test]
    fn empty_dataset_has_no_year_bounds() {
        let ds = IncidentDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.year_bounds(), None);
    }
}
