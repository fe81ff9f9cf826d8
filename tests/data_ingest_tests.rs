//! Tests for building anomaly channels from the raw product files.
//!
//! ## Test Organization
//!
//! 1. **GHCN Parsing** - Fixed-width monthly and inventory files
//! 2. **Grid Boxes** - Box assignment, labels and area weights
//! 3. **GHCN Pipeline** - Baselines, gridded anomalies, weighted means
//! 4. **GISTEMP / CRUTEM** - Monthly and summary files to annual values
//! 5. **Combining** - Aligning products into one series

use std::collections::BTreeMap;
use std::io::Cursor;

use approx::assert_relative_eq;

use climate_viewer::DataError;
use climate_viewer::data::export::to_json_payload;
use climate_viewer::data::ingest::ghcn::{
    GridBox, Station, StationYear, baselines, ghcn_annual, gridded_anomalies, parse_inventory,
    parse_monthly, read_landmask, station_weights, weighted_annual_mean,
};
use climate_viewer::data::ingest::{AnnualSeries, clip_years, combine, crutem, gistemp};
use climate_viewer::data::loader::parse_json_payload;

/// One `.dat` line; `None` months are written as the -9999 sentinel.
fn dat_line(station: &str, year: i32, hundredths: [Option<i32>; 12]) -> String {
    let mut line = format!("{station:<11}{year:04}TAVG");
    for value in hundredths {
        line.push_str(&format!("{:>5}  D", value.unwrap_or(-9999)));
    }
    line
}

fn january(station: &str, year: i32, value: f64) -> StationYear {
    let mut monthly = [None; 12];
    monthly[0] = Some(value);
    StationYear {
        station: station.to_string(),
        year,
        monthly,
    }
}

fn station(id: &str, lat: f64, lon: f64) -> Station {
    Station {
        id: id.to_string(),
        lat,
        lon,
    }
}

// ============================================================================
// GHCN Parsing
// ============================================================================

#[test]
fn test_parse_monthly_scales_and_drops_sentinel() {
    let mut months = [Some(0); 12];
    months[0] = Some(1234);
    months[1] = None;
    months[11] = Some(-250);
    let text = format!("{}\n\n{}\n", dat_line("USW00012345", 1975, months), dat_line("USW00012345", 1976, [None; 12]));

    let records = parse_monthly(Cursor::new(text)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].station, "USW00012345");
    assert_eq!(records[0].year, 1975);
    assert_eq!(records[0].monthly[0], Some(12.34));
    assert_eq!(records[0].monthly[1], None);
    assert_eq!(records[0].monthly[2], Some(0.0));
    assert_eq!(records[0].monthly[11], Some(-2.5));
    assert!(records[1].monthly.iter().all(Option::is_none));
}

#[test]
fn test_parse_monthly_rejects_bad_year() {
    let text = "USW00012345 19xTAVG 1234  D\n";
    assert!(parse_monthly(Cursor::new(text)).is_err());
}

#[test]
fn test_parse_inventory_reads_coordinates() {
    let text = "ACW00011604  17.1167  -61.7833   10.1 ST JOHNS COOLIDGE FLD\n\
                UK000003377  52.3000   -1.2000  100.0 SOMEWHERE\n";
    let stations = parse_inventory(Cursor::new(text)).unwrap();

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].id, "ACW00011604");
    assert_relative_eq!(stations[0].lat, 17.1167);
    assert_relative_eq!(stations[0].lon, -61.7833);
    assert_eq!(stations[1], station("UK000003377", 52.3, -1.2));
}

// ============================================================================
// Grid Boxes
// ============================================================================

#[test]
fn test_grid_box_assignment_and_label() {
    let grid_box = GridBox::containing(52.3, -1.2).unwrap();
    assert_eq!(grid_box, GridBox { lat_band: 10, lon_band: -1 });
    assert_eq!(grid_box.label(), "52.5 lat -2.5 lon");
    assert_eq!(GridBox::from_label("52.5 lat -2.5 lon"), Some(grid_box));
}

#[test]
fn test_grid_box_edges() {
    // an edge belongs to the box to the north / east
    assert_eq!(GridBox::containing(5.0, 0.0).unwrap().lat_band, 1);
    assert_eq!(GridBox::containing(90.0, 180.0).unwrap(), GridBox { lat_band: 17, lon_band: 35 });
    assert_eq!(GridBox::containing(-90.0, -180.0).unwrap(), GridBox { lat_band: -18, lon_band: -36 });
    assert_eq!(GridBox::containing(91.0, 0.0), None);
}

#[test]
fn test_grid_box_label_must_be_a_center() {
    assert_eq!(GridBox::from_label("52.0 lat -2.5 lon"), None);
    assert_eq!(GridBox::from_label("52.5 -2.5"), None);
}

/// The band weights are sin(north) - sin(south), so they sum to 2 over the
/// whole sphere and shrink toward the poles.
#[test]
fn test_area_weights() {
    let total: f64 = (-18..18)
        .map(|lat_band| GridBox { lat_band, lon_band: 0 }.area_weight())
        .sum();
    assert_relative_eq!(total, 2.0, epsilon = 1e-12);

    let equator = GridBox { lat_band: 0, lon_band: 0 }.area_weight();
    let polar = GridBox { lat_band: 17, lon_band: 0 }.area_weight();
    assert_relative_eq!(equator, 5f64.to_radians().sin(), epsilon = 1e-12);
    assert!(polar < equator / 10.0);
}

#[test]
fn test_landmask_and_station_weights() {
    let text = "gridbox,land_percent,ocean_percent\n2.5 lat 2.5 lon,100,0\n62.5 lat 2.5 lon,50,50\n";
    let mask = read_landmask(Cursor::new(text)).unwrap();
    assert_eq!(mask.len(), 2);

    let stations = [
        station("EQ", 2.0, 2.0),
        station("NORTH", 62.0, 2.0),
        station("SOUTH", -60.0, 2.0),
    ];
    let weights = station_weights(&stations, &mask);

    // SOUTH has no land-mask box
    assert_eq!(weights.len(), 2);
    let (eq_box, eq_weight) = weights["EQ"];
    assert_eq!(eq_box.label(), "2.5 lat 2.5 lon");
    assert_relative_eq!(eq_weight, eq_box.area_weight() * 100.0, epsilon = 1e-12);
    assert_relative_eq!(weights["NORTH"].1, weights["NORTH"].0.area_weight() * 50.0, epsilon = 1e-12);
}

#[test]
fn test_landmask_rejects_bad_gridbox() {
    let text = "gridbox,land_percent\nnowhere,10\n";
    assert!(read_landmask(Cursor::new(text)).is_err());
}

// ============================================================================
// GHCN Pipeline
// ============================================================================

#[test]
fn test_baseline_is_mean_over_baseline_years() {
    let records = [
        january("A", 1960, 100.0),
        january("A", 1961, 10.0),
        january("A", 1990, 12.0),
        january("A", 2000, 50.0),
        january("B", 2000, 5.0),
    ];
    let baselines = baselines(&records);

    assert_eq!(baselines.len(), 1);
    assert_relative_eq!(baselines[&("A".to_string(), 0)], 11.0);
    // B has no reading in the baseline period
    assert!(!baselines.contains_key(&("B".to_string(), 0)));
}

#[test]
fn test_gridded_anomalies_average_stations_in_a_box() {
    let records = [
        january("A", 1961, 10.0),
        january("A", 2000, 11.0),
        january("B", 1961, 20.0),
        january("B", 2000, 23.0),
    ];
    let stations = [station("A", 1.0, 1.0), station("B", 4.0, 4.0)];
    let mut mask = BTreeMap::new();
    let grid_box = GridBox::containing(1.0, 1.0).unwrap();
    mask.insert(grid_box, 100.0);

    let cells = gridded_anomalies(&records, &baselines(&records), &station_weights(&stations, &mask));

    assert_relative_eq!(cells[&(2000, grid_box, 0)], 2.0);
    assert_relative_eq!(cells[&(1961, grid_box, 0)], 0.0);
    assert_eq!(cells.len(), 2);
}

#[test]
fn test_weighted_annual_mean() {
    let light = GridBox { lat_band: 0, lon_band: 0 };
    let heavy = GridBox { lat_band: 1, lon_band: 0 };
    let cells = BTreeMap::from([
        ((2000, light, 0), 1.0),
        ((2000, heavy, 0), 2.0),
        ((2001, light, 0), 4.0),
        ((2002, heavy, 3), 9.0),
    ]);
    let mut box_weights = BTreeMap::from([(light, 1.0), (heavy, 3.0)]);

    let annual = weighted_annual_mean(&cells, &box_weights);
    assert_relative_eq!(annual[&2000], 1.75);
    assert_relative_eq!(annual[&2001], 4.0);
    assert_relative_eq!(annual[&2002], 9.0);

    // a year whose cells carry no weight has no value
    box_weights.insert(heavy, 0.0);
    let annual = weighted_annual_mean(&cells, &box_weights);
    assert!(!annual.contains_key(&2002));
}

#[test]
fn test_ghcn_pipeline_end_to_end() {
    let dat = [
        dat_line("EQ", 1961, [Some(1000), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("EQ", 1990, [Some(1200), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("EQ", 2000, [Some(1200), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("NORTH", 1961, [Some(0), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("NORTH", 2000, [Some(200), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("SOUTH", 1961, [Some(0), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("SOUTH", 2000, [Some(900), None, None, None, None, None, None, None, None, None, None, None]),
        dat_line("EQ", 2030, [Some(5000), None, None, None, None, None, None, None, None, None, None, None]),
    ]
    .join("\n");
    let records = parse_monthly(Cursor::new(dat)).unwrap();
    let stations = [
        station("EQ", 2.0, 2.0),
        station("NORTH", 62.0, 2.0),
        station("SOUTH", -60.0, 2.0),
    ];
    let mask = read_landmask(Cursor::new(
        "gridbox,land_percent\n2.5 lat 2.5 lon,100\n62.5 lat 2.5 lon,50\n",
    ))
    .unwrap();

    let annual = ghcn_annual(&records, &stations, &mask, 2024);

    let w_eq = GridBox::containing(2.0, 2.0).unwrap().area_weight() * 100.0;
    let w_north = GridBox::containing(62.0, 2.0).unwrap().area_weight() * 50.0;
    // EQ anomaly 1.0, NORTH anomaly 2.0, SOUTH off the mask
    assert_relative_eq!(annual[&2000], (w_eq * 1.0 + w_north * 2.0) / (w_eq + w_north), epsilon = 1e-12);
    assert_relative_eq!(annual[&1961], -1.0 * w_eq / (w_eq + w_north), epsilon = 1e-12);
    // 2030 is after the last complete year
    assert_eq!(annual.keys().copied().collect::<Vec<_>>(), vec![1961, 1990, 2000]);
}

// ============================================================================
// GISTEMP / CRUTEM
// ============================================================================

#[test]
fn test_gistemp_monthly_to_annual() {
    let text = "Land-only station anomalies\n\
                Year+Month,Station,Land+Ocean,Land_Only,Open_Ocean\n\
                189912,x,0.0,-0.4,0.0\n\
                190001,x,0.1,0.5,0.0\n\
                190002,x,0.1,0.7,0.0\n\
                190003,x,0.1,,0.0\n\
                190101,x,0.2,****,0.0\n";
    let annual = gistemp::read_gistemp(Cursor::new(text)).unwrap();

    assert_relative_eq!(annual[&1900], 0.6, epsilon = 1e-12);
    assert_relative_eq!(annual[&1899], -0.4);
    assert!(!annual.contains_key(&1901));

    let clipped = clip_years(annual, 1900, 2024);
    assert_eq!(clipped.keys().copied().collect::<Vec<_>>(), vec![1900]);
}

#[test]
fn test_gistemp_rejects_non_numeric_value() {
    let text = "a\nb\n190001,x,0.1,warm,0.0\n";
    assert!(gistemp::read_gistemp(Cursor::new(text)).is_err());
}

#[test]
fn test_crutem_keeps_anomaly_rows() {
    let months = "0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1";
    let text = format!(
        "CRUTEM5 global land\n\
         1900 {months} 95\n\
         1900 {months} 0.25\n\
         \n\
         1901 {months} 96\n\
         1901 {months} -0.1\n"
    );
    let annual = crutem::read_crutem(Cursor::new(text)).unwrap();

    assert_eq!(annual.len(), 2);
    assert_relative_eq!(annual[&1900], 0.25);
    assert_relative_eq!(annual[&1901], -0.1);
}

#[test]
fn test_crutem_rejects_short_row() {
    let text = "title\ncoverage\n1900 0.1 0.2\n";
    assert!(crutem::read_crutem(Cursor::new(text)).is_err());
}

// ============================================================================
// Combining
// ============================================================================

#[test]
fn test_combine_aligns_on_union_of_years() {
    let giss: AnnualSeries = BTreeMap::from([(1900, 0.1), (1901, 0.2)]);
    let crutem: AnnualSeries = BTreeMap::from([(1901, 0.3), (1903, 0.4)]);
    let series = combine(vec![("giss".to_string(), giss), ("crutem".to_string(), crutem)]).unwrap();

    assert_eq!(series.years(), &[1900, 1901, 1903]);
    assert_eq!(series.channel("giss").unwrap(), &[Some(0.1), Some(0.2), None]);
    assert_eq!(series.channel("crutem").unwrap(), &[None, Some(0.3), Some(0.4)]);

    // the written payload loads back as the same series
    let text = to_json_payload(&series).to_string();
    assert_eq!(parse_json_payload(&text).unwrap(), series);
}

#[test]
fn test_combine_without_years() {
    let err = combine(vec![("giss".to_string(), AnnualSeries::new())]).unwrap_err();
    assert_eq!(err, DataError::NoYears);
}
