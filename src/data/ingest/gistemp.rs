use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use super::{AnnualSeries, FIRST_YEAR, clip_years};

/// Lines before the first data row.
const PREAMBLE_LINES: usize = 2;
/// Column holding the land-only anomaly.
const LAND_ONLY_COLUMN: usize = 3;

/// Read the GISTEMP monthly station table and average the land-only
/// anomaly of each calendar year.
///
/// After a two-line preamble each row is
/// `<year+month>,<station>,<land+ocean>,<land only>,<open ocean>`; the year
/// is the first four characters of the first column. Empty cells and cells
/// made only of `*` are missing; a year with no land-only value is left out.
pub fn read_gistemp<R: Read>(input: R) -> Result<AnnualSeries> {
    let mut input = BufReader::new(input);
    let mut skipped = String::new();
    for _ in 0..PREAMBLE_LINES {
        skipped.clear();
        input.read_line(&mut skipped).context("reading GISTEMP preamble")?;
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("GISTEMP row {row_no}"))?;
        let stamp = record.get(0).unwrap_or("").trim();
        let year: i32 = stamp
            .get(..4)
            .and_then(|y| y.parse().ok())
            .with_context(|| format!("GISTEMP row {row_no}: '{stamp}' has no year"))?;

        let cell = record.get(LAND_ONLY_COLUMN).unwrap_or("").trim();
        if cell.trim_matches('*').is_empty() {
            continue;
        }
        let value: f64 = cell
            .parse()
            .with_context(|| format!("GISTEMP row {row_no}: '{cell}' is not a number"))?;
        let entry = sums.entry(year).or_default();
        entry.0 += value;
        entry.1 += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect())
}

/// Read a GISTEMP file and clip it to `FIRST_YEAR..=last_year`.
pub fn load_gistemp(path: &Path, last_year: i32) -> Result<AnnualSeries> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let annual = read_gistemp(file).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("GISTEMP: {} years from {}", annual.len(), path.display());
    Ok(clip_years(annual, FIRST_YEAR, last_year))
}
