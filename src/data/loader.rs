use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Reading, TimeSeries};
use crate::error::DataError;

/// Name of the year axis in JSON payloads and tables.
pub const YEARS_FIELD: &str = "years";
const ERROR_FIELD: &str = "error";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an anomaly dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `{ "years": [...], "giss": [...], "ghcn": [...], ... }`
/// * `.csv`     – a `year` column plus one column per channel
/// * `.parquet` – an integer `year` column plus float channel columns
pub fn load_file(path: &Path) -> Result<TimeSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let series = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if series.is_empty() {
        return Err(DataError::NoYears.into());
    }
    log::debug!(
        "{}: {} years, channels {:?}",
        path.display(),
        series.len(),
        series.channel_keys().collect::<Vec<_>>()
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (the shape served by the data endpoint):
///
/// ```json
/// {
///   "years":  [1880, 1881, ...],
///   "giss":   [-0.17, -0.09, null, ...],
///   "crutem": [-0.42, null, ...]
/// }
/// ```
///
/// An `"error"` string in the payload is reported instead of the data.
fn load_json(path: &Path) -> Result<TimeSeries> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_payload(&text)
}

/// Parse a JSON payload held in memory.
pub fn parse_json_payload(text: &str) -> Result<TimeSeries> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    Ok(series_from_json(&root)?)
}

/// Validate and convert an already-parsed JSON payload.
pub fn series_from_json(root: &JsonValue) -> Result<TimeSeries, DataError> {
    let obj = root.as_object().ok_or(DataError::NotAnObject)?;

    if let Some(message) = obj.get(ERROR_FIELD).and_then(JsonValue::as_str) {
        return Err(DataError::Remote(message.to_string()));
    }

    let years_json = match obj.get(YEARS_FIELD).and_then(JsonValue::as_array) {
        Some(arr) if !arr.is_empty() => arr,
        _ => return Err(DataError::NoYears),
    };
    let years = years_json
        .iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .ok_or(DataError::InvalidYear { index })
        })
        .collect::<Result<Vec<i32>, _>>()?;

    let mut channels = BTreeMap::new();
    for (key, val) in obj {
        if key == YEARS_FIELD || key == ERROR_FIELD {
            continue;
        }
        let arr = val
            .as_array()
            .ok_or_else(|| DataError::ChannelNotArray(key.clone()))?;
        let readings = arr
            .iter()
            .enumerate()
            .map(|(index, v)| json_to_reading(v, key, index))
            .collect::<Result<Vec<Reading>, _>>()?;
        channels.insert(key.clone(), readings);
    }

    TimeSeries::new(years, channels)
}

fn json_to_reading(val: &JsonValue, channel: &str, index: usize) -> Result<Reading, DataError> {
    match val {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => n.as_f64().map(Some).ok_or_else(|| DataError::InvalidReading {
            channel: channel.to_string(),
            index,
        }),
        _ => Err(DataError::InvalidReading {
            channel: channel.to_string(),
            index,
        }),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with a `year` column (any case) and one column per
/// channel. Empty cells, `NA`, `NaN` and `null` are missing readings.
fn load_csv(path: &Path) -> Result<TimeSeries> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse a CSV table from any reader.
pub fn read_csv<R: Read>(input: R) -> Result<TimeSeries> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let year_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("year") || h.eq_ignore_ascii_case(YEARS_FIELD))
        .context("CSV missing 'year' column")?;

    let mut years = Vec::new();
    let mut columns: Vec<Vec<Reading>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let year_cell = record.get(year_idx).unwrap_or("").trim();
        let year: i32 = year_cell
            .parse()
            .with_context(|| format!("CSV row {row_no}: '{year_cell}' is not a year"))?;
        years.push(year);

        for (col_idx, column) in columns.iter_mut().enumerate() {
            if col_idx == year_idx {
                continue;
            }
            let cell = record.get(col_idx).unwrap_or("");
            let reading = parse_cell(cell).with_context(|| {
                format!("CSV row {row_no}, column '{}': '{cell}' is not a number", headers[col_idx])
            })?;
            column.push(reading);
        }
    }

    let channels = headers
        .into_iter()
        .zip(columns)
        .enumerate()
        .filter(|(i, _)| *i != year_idx)
        .map(|(_, pair)| pair)
        .collect();

    Ok(TimeSeries::new(years, channels)?)
}

fn parse_cell(s: &str) -> Result<Reading, std::num::ParseFloatError> {
    let s = s.trim();
    if s.is_empty()
        || s.eq_ignore_ascii_case("na")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("null")
    {
        return Ok(None);
    }
    s.parse::<f64>().map(Some)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing one row per year.
///
/// Expected schema:
/// - `year`: Int32 or Int64
/// - any Float64 / Float32 column: a channel, nulls are missing readings
///
/// Columns of other types are skipped with a warning.
fn load_parquet(path: &Path) -> Result<TimeSeries> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut years: Vec<i32> = Vec::new();
    let mut channels: BTreeMap<String, Vec<Reading>> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let year_idx = schema
            .index_of("year")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'year' column"))?;
        years.extend(extract_years(batch.column(year_idx))?);

        for (col_idx, field) in schema.fields().iter().enumerate() {
            if col_idx == year_idx {
                continue;
            }
            match extract_readings(batch.column(col_idx)) {
                Some(values) => channels
                    .entry(field.name().clone())
                    .or_default()
                    .extend(values),
                None => log::warn!(
                    "skipping parquet column '{}' of type {:?}",
                    field.name(),
                    field.data_type()
                ),
            }
        }
    }

    Ok(TimeSeries::new(years, channels)?)
}

// -- Parquet / Arrow helpers --

fn extract_years(col: &Arc<dyn Array>) -> Result<Vec<i32>> {
    if col.null_count() > 0 {
        bail!("null value in 'year' column");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.values().to_vec())
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.values()
                .iter()
                .map(|&y| i32::try_from(y).with_context(|| format!("year {y} out of range")))
                .collect()
        }
        other => bail!("Expected Int32 or Int64 'year' column, got {other:?}"),
    }
}

/// Readings from a float column, or `None` if the column is not a channel.
fn extract_readings(col: &Arc<dyn Array>) -> Option<Vec<Reading>> {
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Some(arr.iter().map(|v| v.filter(|x| !x.is_nan())).collect())
    } else {
        col.as_any()
            .downcast_ref::<Float32Array>()
            .map(|arr| arr.iter().map(|v| v.filter(|x| !x.is_nan()).map(f64::from)).collect())
    }
}
