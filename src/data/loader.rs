use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{IncidentDataset, IncidentRecord};

// ---------------------------------------------------------------------------
// Column naming
// ---------------------------------------------------------------------------

/// A source column: the name used by the published dataset and an English
/// alias accepted as well.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub alias: &'static str,
}

pub const DATE: Column = Column { name: "FECHA HECHO", alias: "date" };
pub const MUNICIPALITY: Column = Column { name: "MUNICIPIO", alias: "municipality" };
pub const WEAPON_TYPE: Column = Column { name: "ARMA MEDIO", alias: "weapon_type" };
pub const GENDER: Column = Column { name: "GENERO", alias: "gender" };
pub const COUNT: Column = Column { name: "CANTIDAD", alias: "count" };

impl Column {
    fn matches(&self, header: &str) -> bool {
        header == self.name || header == self.alias
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an incident dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – columnar file as published (recommended)
/// * `.csv`     – header row with the same column names
/// * `.json`    – `[{ "FECHA HECHO": ..., "MUNICIPIO": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<IncidentDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if records.is_empty() {
        return Err(DataError::Empty).with_context(|| format!("loading {}", path.display()));
    }

    Ok(IncidentDataset::from_records(records))
}

/// Parse a calendar date written as `YYYY-MM-DD`, `DD/MM/YYYY` or
/// `YYYY/MM/DD`, optionally followed by a time part (` ` or `T` separated).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let day_part = text.split([' ', 'T']).next().unwrap_or(text);
    ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
}

fn to_count(raw: i64, row: usize) -> Result<u64, DataError> {
    u64::try_from(raw).map_err(|_| DataError::NegativeCount { row, count: raw })
}

// ---------------------------------------------------------------------------
// Row-oriented formats (CSV / JSON)
// ---------------------------------------------------------------------------

/// One row as it appears in a text file. `D` is the raw date cell, which is
/// always text in CSV but may be epoch milliseconds in pandas' JSON output.
#[derive(Debug, Deserialize)]
struct RawRow<D> {
    #[serde(rename = "FECHA HECHO", alias = "date")]
    date: Option<D>,
    #[serde(rename = "MUNICIPIO", alias = "municipality")]
    municipality: Option<String>,
    #[serde(rename = "ARMA MEDIO", alias = "weapon_type")]
    weapon_type: Option<String>,
    #[serde(rename = "GENERO", alias = "gender")]
    gender: Option<String>,
    #[serde(rename = "CANTIDAD", alias = "count")]
    count: Option<i64>,
}

impl<D> RawRow<D> {
    fn into_record(
        self,
        row: usize,
        parse: impl Fn(&D) -> Option<NaiveDate>,
        show: impl Fn(&D) -> String,
    ) -> Result<IncidentRecord, DataError> {
        let null = |column: &'static str| DataError::NullValue { column, row };

        let raw_date = self.date.ok_or_else(|| null(DATE.name))?;
        let date = parse(&raw_date).ok_or_else(|| DataError::InvalidDate {
            row,
            value: show(&raw_date),
        })?;

        Ok(IncidentRecord {
            date,
            municipality: self.municipality.ok_or_else(|| null(MUNICIPALITY.name))?,
            weapon_type: self.weapon_type.ok_or_else(|| null(WEAPON_TYPE.name))?,
            gender: self.gender.ok_or_else(|| null(GENDER.name))?,
            count: to_count(self.count.ok_or_else(|| null(COUNT.name))?, row)?,
        })
    }
}

/// CSV layout: header row with column names, one record per line.
/// Extra columns are ignored.
fn load_csv(path: &Path) -> Result<Vec<IncidentRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for column in [DATE, MUNICIPALITY, WEAPON_TYPE, GENDER, COUNT] {
        if !headers.iter().any(|h| column.matches(h)) {
            return Err(DataError::MissingColumn(column.name).into());
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRow<String>>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(raw.into_record(row_no, |s| parse_date(s), String::clone)?);
    }
    Ok(records)
}

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
/// Dates may be strings or epoch milliseconds.
fn load_json(path: &Path) -> Result<Vec<IncidentRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<RawRow<JsonValue>> = serde_json::from_str(&text).context("parsing JSON")?;

    rows.into_iter()
        .enumerate()
        .map(|(i, raw)| {
            raw.into_record(i, json_date, JsonValue::to_string)
                .map_err(anyhow::Error::from)
        })
        .collect()
}

fn json_date(value: &JsonValue) -> Option<NaiveDate> {
    match value {
        JsonValue::String(s) => parse_date(s),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of incident records.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`, dates as
/// `Timestamp(ns)`, categoricals dictionary-encoded) and **Polars**
/// (`df.write_parquet()`, dates as `Date32`). Every column is normalised
/// through Arrow's cast kernel before rows are read.
fn load_parquet(path: &Path) -> Result<Vec<IncidentRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = records.len();
        records.extend(records_from_batch(&batch, offset)?);
    }

    Ok(records)
}

/// Convert one record batch. `offset` is the global row number of its first
/// row, used in error messages.
fn records_from_batch(batch: &RecordBatch, offset: usize) -> Result<Vec<IncidentRecord>> {
    let schema = batch.schema();

    let dates = date_column(batch, column_index(&schema, DATE)?, offset)?;
    let municipalities = cast_column(batch, &schema, MUNICIPALITY, &DataType::Utf8)?;
    let weapons = cast_column(batch, &schema, WEAPON_TYPE, &DataType::Utf8)?;
    let genders = cast_column(batch, &schema, GENDER, &DataType::Utf8)?;
    let counts = count_column(batch, &schema, offset)?;

    let municipalities = municipalities.as_string::<i32>();
    let weapons = weapons.as_string::<i32>();
    let genders = genders.as_string::<i32>();
    let counts = counts.as_primitive::<Int64Type>();

    let mut records = Vec::with_capacity(batch.num_rows());

    for i in 0..batch.num_rows() {
        let row = offset + i;
        let null = |column: &'static str| DataError::NullValue { column, row };

        let date = dates[i].ok_or_else(|| null(DATE.name))?;
        let text = |arr: &arrow::array::StringArray, column: Column| {
            if arr.is_null(i) {
                Err(null(column.name))
            } else {
                Ok(arr.value(i).to_string())
            }
        };

        if counts.is_null(i) {
            return Err(null(COUNT.name).into());
        }

        records.push(IncidentRecord {
            date,
            municipality: text(municipalities, MUNICIPALITY)?,
            weapon_type: text(weapons, WEAPON_TYPE)?,
            gender: text(genders, GENDER)?,
            count: to_count(counts.value(i), row)?,
        });
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn column_index(schema: &Schema, column: Column) -> Result<usize, DataError> {
    schema
        .index_of(column.name)
        .or_else(|_| schema.index_of(column.alias))
        .map_err(|_| DataError::MissingColumn(column.name))
}

fn cast_column(
    batch: &RecordBatch,
    schema: &Schema,
    column: Column,
    to: &DataType,
) -> Result<ArrayRef> {
    let col = batch.column(column_index(schema, column)?);
    cast(col, to).map_err(|_| {
        anyhow::Error::from(DataError::UnsupportedType {
            column: column.name,
            data_type: format!("{:?}", col.data_type()),
        })
    })
}

/// Read the count column as `Int64`. Float columns (pandas writes integer
/// columns as `float64` once they hold a NaN) must carry whole numbers only.
fn count_column(batch: &RecordBatch, schema: &Schema, offset: usize) -> Result<ArrayRef> {
    let col = batch.column(column_index(schema, COUNT)?);
    if col.data_type().is_floating() {
        let floats = cast_column(batch, schema, COUNT, &DataType::Float64)?;
        let floats = floats.as_primitive::<Float64Type>();
        for row in 0..floats.len() {
            if floats.is_null(row) {
                continue;
            }
            let value = floats.value(row);
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(DataError::NonIntegralCount {
                    row: offset + row,
                    value,
                }
                .into());
            }
        }
    }
    cast_column(batch, schema, COUNT, &DataType::Int64)
}

fn is_textual(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, value) => is_textual(value),
        _ => false,
    }
}

/// Read the date column as one `Option<NaiveDate>` per row (`None` = null).
///
/// Text columns are parsed with [`parse_date`]; temporal columns are cast
/// to `Date32`. `offset` is the global row number of the batch's first row.
fn date_column(
    batch: &RecordBatch,
    idx: usize,
    offset: usize,
) -> Result<Vec<Option<NaiveDate>>> {
    let col = batch.column(idx);
    let unsupported = || DataError::UnsupportedType {
        column: DATE.name,
        data_type: format!("{:?}", col.data_type()),
    };

    if is_textual(col.data_type()) {
        let text = cast(col, &DataType::Utf8).map_err(|_| unsupported())?;
        let text = text.as_string::<i32>();
        return (0..text.len())
            .map(|row| {
                if text.is_null(row) {
                    return Ok(None);
                }
                let value = text.value(row);
                parse_date(value).map(Some).ok_or_else(|| {
                    anyhow::Error::from(DataError::InvalidDate {
                        row: offset + row,
                        value: value.to_string(),
                    })
                })
            })
            .collect();
    }

    let days = cast(col, &DataType::Date32).map_err(|_| unsupported())?;
    let days = days.as_primitive::<Date32Type>();
    Ok((0..days.len())
        .map(|row| {
            if days.is_null(row) {
                None
            } else {
                days.value_as_date(row)
            }
        })
        .collect())
}
