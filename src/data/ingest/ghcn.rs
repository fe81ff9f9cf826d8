use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::{AnnualSeries, FIRST_YEAR, clip_years, fixed_field};

/// Missing-value sentinel in the monthly files.
const MISSING: i32 = -9999;
/// Years whose mean per station and month is the anomaly baseline.
pub const BASELINE_YEARS: RangeInclusive<i32> = 1961..=1990;
/// Grid box edge in degrees.
pub const GRID_SIZE: f64 = 5.0;

// ---------------------------------------------------------------------------
// Station records (.dat) and inventory (.inv)
// ---------------------------------------------------------------------------

/// One line of the GHCN v4 monthly file: a station-year with twelve monthly
/// means in °C.
#[derive(Debug, Clone, PartialEq)]
pub struct StationYear {
    pub station: String,
    pub year: i32,
    pub monthly: [Option<f64>; 12],
}

/// Station location from the inventory file.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

/// Parse the fixed-width monthly file.
///
/// Layout per line: station id in columns 0-11, year 11-15, element 15-19,
/// then for each month a 5-character value in hundredths of °C followed by
/// three flag characters. `-9999` and blank values are missing.
pub fn parse_monthly<R: BufRead>(input: R) -> Result<Vec<StationYear>> {
    let mut records = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let year_text = fixed_field(&line, 11, 15);
        let year: i32 = year_text
            .parse()
            .with_context(|| format!("line {}: '{year_text}' is not a year", line_no + 1))?;

        let mut monthly = [None; 12];
        for (month, slot) in monthly.iter_mut().enumerate() {
            let start = 19 + 8 * month;
            let cell = fixed_field(&line, start, start + 5);
            *slot = parse_hundredths(cell)
                .with_context(|| format!("line {}, month {}: '{cell}'", line_no + 1, month + 1))?;
        }

        records.push(StationYear {
            station: fixed_field(&line, 0, 11).to_string(),
            year,
            monthly,
        });
    }
    Ok(records)
}

fn parse_hundredths(cell: &str) -> Result<Option<f64>, std::num::ParseIntError> {
    if cell.is_empty() {
        return Ok(None);
    }
    let raw: i32 = cell.parse()?;
    Ok((raw != MISSING).then(|| f64::from(raw) / 100.0))
}

/// Parse the fixed-width inventory: id 0-11, latitude 12-21, longitude 21-31.
pub fn parse_inventory<R: BufRead>(input: R) -> Result<Vec<Station>> {
    let mut stations = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let coordinate = |start, end| -> Result<f64> {
            let text = fixed_field(&line, start, end);
            text.parse()
                .with_context(|| format!("line {}: '{text}' is not a coordinate", line_no + 1))
        };
        stations.push(Station {
            id: fixed_field(&line, 0, 11).to_string(),
            lat: coordinate(12, 21)?,
            lon: coordinate(21, 31)?,
        });
    }
    Ok(stations)
}

// ---------------------------------------------------------------------------
// Grid boxes and the land mask
// ---------------------------------------------------------------------------

/// A 5° × 5° box, identified by its band indices (`lat_band` in -18..=17,
/// `lon_band` in -36..=35).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridBox {
    pub lat_band: i32,
    pub lon_band: i32,
}

impl GridBox {
    /// The box containing a location. Points on an edge belong to the box to
    /// the north / east, except at the poles and the antimeridian.
    pub fn containing(lat: f64, lon: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        let band = |value: f64, max: i32| ((value / GRID_SIZE).floor() as i32).min(max - 1);
        Some(GridBox {
            lat_band: band(lat, 18),
            lon_band: band(lon, 36),
        })
    }

    pub fn lat_center(&self) -> f64 {
        f64::from(self.lat_band) * GRID_SIZE + GRID_SIZE / 2.0
    }

    pub fn lon_center(&self) -> f64 {
        f64::from(self.lon_band) * GRID_SIZE + GRID_SIZE / 2.0
    }

    /// Label used by the land mask, e.g. `"52.5 lat -2.5 lon"`.
    pub fn label(&self) -> String {
        format!("{} lat {} lon", self.lat_center(), self.lon_center())
    }

    /// Inverse of [`GridBox::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        let parts: Vec<&str> = label.split_whitespace().collect();
        let [lat, "lat", lon, "lon"] = parts.as_slice() else {
            return None;
        };
        let lat: f64 = lat.parse().ok()?;
        let lon: f64 = lon.parse().ok()?;
        GridBox::containing(lat, lon).filter(|b| b.lat_center() == lat && b.lon_center() == lon)
    }

    /// Area of the box's latitude band on the unit sphere, up to a constant:
    /// `sin(north) - sin(south)`.
    pub fn area_weight(&self) -> f64 {
        let half = GRID_SIZE / 2.0;
        let center = self.lat_center();
        (center + half).to_radians().sin() - (center - half).to_radians().sin()
    }
}

#[derive(Debug, Deserialize)]
struct LandmaskRow {
    gridbox: String,
    land_percent: f64,
}

/// Read the land mask table: a `gridbox` label column and a `land_percent`
/// column (other columns are ignored).
pub fn read_landmask<R: Read>(input: R) -> Result<BTreeMap<GridBox, f64>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut mask = BTreeMap::new();
    for (row_no, row) in reader.deserialize::<LandmaskRow>().enumerate() {
        let row = row.with_context(|| format!("landmask row {row_no}"))?;
        let Some(grid_box) = GridBox::from_label(&row.gridbox) else {
            bail!("landmask row {row_no}: bad gridbox '{}'", row.gridbox);
        };
        mask.insert(grid_box, row.land_percent);
    }
    Ok(mask)
}

/// Weight of each station's grid box: band area times land fraction.
/// Stations outside the grid or whose box is absent from the mask are left
/// out.
pub fn station_weights(stations: &[Station], landmask: &BTreeMap<GridBox, f64>) -> BTreeMap<String, (GridBox, f64)> {
    stations
        .iter()
        .filter_map(|s| {
            let grid_box = GridBox::containing(s.lat, s.lon)?;
            let land = landmask.get(&grid_box)?;
            Some((s.id.clone(), (grid_box, grid_box.area_weight() * land)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Baselines, anomalies and the weighted mean
// ---------------------------------------------------------------------------

/// Mean of each (station, month) over [`BASELINE_YEARS`], from the present
/// values only. Pairs with no value in the baseline period get no entry.
pub fn baselines(records: &[StationYear]) -> BTreeMap<(String, usize), f64> {
    let mut sums: BTreeMap<(String, usize), (f64, usize)> = BTreeMap::new();
    for record in records.iter().filter(|r| BASELINE_YEARS.contains(&r.year)) {
        for (month, value) in record.monthly.iter().enumerate() {
            if let Some(value) = value {
                let entry = sums.entry((record.station.clone(), month)).or_default();
                entry.0 += value;
                entry.1 += 1;
            }
        }
    }
    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Grid-box mean anomaly per (year, box, month).
pub fn gridded_anomalies(
    records: &[StationYear],
    baselines: &BTreeMap<(String, usize), f64>,
    weights: &BTreeMap<String, (GridBox, f64)>,
) -> BTreeMap<(i32, GridBox, usize), f64> {
    let mut cells: BTreeMap<(i32, GridBox, usize), (f64, usize)> = BTreeMap::new();
    for record in records {
        let Some(&(grid_box, _)) = weights.get(&record.station) else {
            continue;
        };
        for (month, value) in record.monthly.iter().enumerate() {
            let Some(value) = value else { continue };
            let Some(baseline) = baselines.get(&(record.station.clone(), month)) else {
                continue;
            };
            let entry = cells.entry((record.year, grid_box, month)).or_default();
            entry.0 += value - baseline;
            entry.1 += 1;
        }
    }
    cells
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Weighted mean over every (box, month) cell of each year. Years whose
/// cells carry no weight are left out.
pub fn weighted_annual_mean(
    cells: &BTreeMap<(i32, GridBox, usize), f64>,
    box_weights: &BTreeMap<GridBox, f64>,
) -> AnnualSeries {
    let mut totals: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for (&(year, grid_box, _), &anomaly) in cells {
        let weight = box_weights.get(&grid_box).copied().unwrap_or(0.0);
        let entry = totals.entry(year).or_default();
        entry.0 += weight * anomaly;
        entry.1 += weight;
    }
    totals
        .into_iter()
        .filter(|(_, (_, weight))| *weight > 0.0)
        .map(|(year, (sum, weight))| (year, sum / weight))
        .collect()
}

/// Full GHCN pipeline on parsed inputs, clipped to `FIRST_YEAR..=last_year`.
pub fn ghcn_annual(
    records: &[StationYear],
    stations: &[Station],
    landmask: &BTreeMap<GridBox, f64>,
    last_year: i32,
) -> AnnualSeries {
    let weights = station_weights(stations, landmask);
    log::info!("GHCN: {} of {} stations on the land mask", weights.len(), stations.len());

    let baselines = baselines(records);
    log::debug!("GHCN: {} station-month baselines", baselines.len());

    let cells = gridded_anomalies(records, &baselines, &weights);
    let box_weights: BTreeMap<GridBox, f64> = weights.values().copied().collect();
    log::debug!("GHCN: {} grid cells with anomalies", cells.len());

    clip_years(weighted_annual_mean(&cells, &box_weights), FIRST_YEAR, last_year)
}

/// Read the three GHCN inputs from disk and run [`ghcn_annual`].
pub fn load_ghcn(dat: &Path, inv: &Path, landmask: &Path, last_year: i32) -> Result<AnnualSeries> {
    let open = |path: &Path| {
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))
    };
    let records = parse_monthly(BufReader::new(open(dat)?))
        .with_context(|| format!("parsing {}", dat.display()))?;
    log::info!("GHCN: {} station-years from {}", records.len(), dat.display());
    let stations = parse_inventory(BufReader::new(open(inv)?))
        .with_context(|| format!("parsing {}", inv.display()))?;
    let mask = read_landmask(open(landmask)?)
        .with_context(|| format!("parsing {}", landmask.display()))?;

    Ok(ghcn_annual(&records, &stations, &mask, last_year))
}
