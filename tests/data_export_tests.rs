//! Tests for CSV export of the current view.

mod common;

use climate_viewer::data::export::write_csv;
use climate_viewer::data::model::default_descriptors;
use climate_viewer::filter_by_range;

use common::sample_series;

fn export(view: &climate_viewer::TimeSeries, descriptors: &[climate_viewer::DatasetDescriptor]) -> String {
    let mut out = Vec::new();
    write_csv(&mut out, view, descriptors).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_header_and_missing_cells() {
    let view = filter_by_range(&sample_series(), 2000, 2002);
    let text = export(&view, &default_descriptors());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Year,NASA GISTEMP,GHCN Raw (Simple),CRUTEM5");
    assert_eq!(lines[1], "2000,0,0.05,-0.2");
    assert_eq!(lines[2], "2001,0.1,,");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_hidden_datasets_are_left_out() {
    let view = filter_by_range(&sample_series(), 2000, 2001);
    let mut descriptors = default_descriptors();
    descriptors[1].visible = false;
    descriptors[2].visible = false;

    let text = export(&view, &descriptors);
    assert_eq!(text, "Year,NASA GISTEMP\n2000,0\n2001,0.1\n");
}

#[test]
fn test_row_count_matches_view() {
    let view = sample_series();
    let mut out = Vec::new();
    let rows = write_csv(&mut out, &view, &default_descriptors()).unwrap();
    assert_eq!(rows, 10);
}
