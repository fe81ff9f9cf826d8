use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::{AnnualSeries, FIRST_YEAR, clip_years};

/// Tokens in a data row: year, twelve months, annual mean.
const ROW_TOKENS: usize = 14;

/// Read the CRUTEM5 summary text and keep each year's annual anomaly.
///
/// The first line is a title. The remaining non-blank rows alternate, and
/// the anomaly rows are the second, fourth, ... of them. Each anomaly row is
/// whitespace separated: year, twelve monthly values, annual value.
pub fn read_crutem<R: Read>(input: R) -> Result<AnnualSeries> {
    let mut annual = AnnualSeries::new();
    let rows = BufReader::new(input)
        .lines()
        .skip(1)
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()));

    for (row_no, line) in rows.enumerate() {
        let line = line.with_context(|| format!("reading CRUTEM row {row_no}"))?;
        if row_no % 2 == 0 {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < ROW_TOKENS {
            bail!("CRUTEM row {row_no}: expected {ROW_TOKENS} values, found {}", tokens.len());
        }
        let year: i32 = tokens[0]
            .parse()
            .with_context(|| format!("CRUTEM row {row_no}: '{}' is not a year", tokens[0]))?;
        let value: f64 = tokens[ROW_TOKENS - 1]
            .parse()
            .with_context(|| format!("CRUTEM row {row_no}: '{}' is not a number", tokens[ROW_TOKENS - 1]))?;
        annual.insert(year, value);
    }
    Ok(annual)
}

/// Read a CRUTEM file and clip it to `FIRST_YEAR..=last_year`.
pub fn load_crutem(path: &Path, last_year: i32) -> Result<AnnualSeries> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let annual = read_crutem(file).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("CRUTEM: {} years from {}", annual.len(), path.display());
    Ok(clip_years(annual, FIRST_YEAR, last_year))
}
