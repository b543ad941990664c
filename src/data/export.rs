use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use super::loader::{COUNT, DATE, GENDER, MUNICIPALITY, WEAPON_TYPE};
use super::model::IncidentDataset;

/// Write the rows of `view` as CSV, in view order, with the source column
/// names as header. The header is written even when `view` is empty.
pub fn export_csv<W: Write>(
    dataset: &IncidentDataset,
    view: &FilteredView,
    writer: W,
) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record([DATE.name, MUNICIPALITY.name, WEAPON_TYPE.name, GENDER.name, COUNT.name])
        .context("writing CSV header")?;

    let mut written = 0;
    for record in view.records(dataset) {
        csv_writer
            .serialize(record)
            .with_context(|| format!("writing CSV row {written}"))?;
        written += 1;
    }
    csv_writer.flush().context("flushing CSV output")?;
    Ok(written)
}

/// Export `view` to a CSV file at `path`, returning the number of rows.
pub fn export_csv_file(path: &Path, dataset: &IncidentDataset, view: &FilteredView) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let written = export_csv(dataset, view, file)?;
    log::info!("Exported {written} rows to {}", path.display());
    Ok(written)
}
