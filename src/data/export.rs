use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};

use super::loader::YEARS_FIELD;
use super::model::{DatasetDescriptor, TimeSeries};

// ---------------------------------------------------------------------------
// CSV export of the current view
// ---------------------------------------------------------------------------

/// Write one row per year of `view` with one column per visible descriptor
/// that has a channel in the view.
///
/// Header: `Year` followed by the descriptor labels. Missing readings are
/// written as empty cells. Returns the number of data rows written.
pub fn write_csv<W: Write>(out: W, view: &TimeSeries, descriptors: &[DatasetDescriptor]) -> Result<usize> {
    let columns: Vec<(&DatasetDescriptor, &[Option<f64>])> = descriptors
        .iter()
        .filter(|d| d.visible)
        .filter_map(|d| view.channel(&d.key).map(|values| (d, values)))
        .collect();

    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Year".to_string()];
    header.extend(columns.iter().map(|(d, _)| d.label.clone()));
    writer.write_record(&header).context("writing CSV header")?;

    for (row, year) in view.years().iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(year.to_string());
        for (_, values) in &columns {
            record.push(values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row for {year}"))?;
    }
    writer.flush().context("flushing CSV output")?;

    Ok(view.len())
}

/// Export the view to a file on disk.
pub fn export_csv_file(path: &Path, view: &TimeSeries, descriptors: &[DatasetDescriptor]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let rows = write_csv(file, view, descriptors)?;
    log::info!("Exported {rows} rows to {}", path.display());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON payload
// ---------------------------------------------------------------------------

/// The series in the loader's JSON shape: `years` plus one array per
/// channel, missing readings as `null`.
pub fn to_json_payload(series: &TimeSeries) -> JsonValue {
    let mut payload = Map::new();
    payload.insert(YEARS_FIELD.to_string(), JsonValue::from(series.years().to_vec()));
    for (key, values) in series.channels() {
        payload.insert(key.clone(), JsonValue::from(values.clone()));
    }
    JsonValue::Object(payload)
}

/// Write the JSON payload to a file on disk.
pub fn export_json_file(path: &Path, series: &TimeSeries) -> Result<()> {
    let text = serde_json::to_string_pretty(&to_json_payload(series)).context("serializing JSON payload")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {} years to {}", series.len(), path.display());
    Ok(())
}
