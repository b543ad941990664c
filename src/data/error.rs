use thiserror::Error;

/// Problems found while turning a source file into an `IncidentDataset`.
///
/// `row` is the 0-based index of the data record in the file. The CSV
/// header line is not counted, so CSV row 0 is the second line of the file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: column '{column}' is null")]
    NullValue { column: &'static str, row: usize },

    #[error("row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: negative count {count}")]
    NegativeCount { row: usize, count: i64 },

    #[error("row {row}: count {value} is not a whole number")]
    NonIntegralCount { row: usize, value: f64 },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        column: &'static str,
        data_type: String,
    },

    #[error("dataset contains no rows")]
    Empty,
}
