#![allow(dead_code)]

use std::collections::BTreeMap;

use climate_viewer::{Reading, TimeSeries};

/// Ten years (2000-2009) with three channels:
/// * `giss`   – 0.1 * index, complete
/// * `ghcn`   – like giss plus 0.05, missing at 2001 and 2005
/// * `crutem` – only 2000 and 2009 present
pub fn sample_series() -> TimeSeries {
    let years: Vec<i32> = (2000..2010).collect();
    let giss: Vec<Reading> = (0..10).map(|i| Some(0.1 * i as f64)).collect();
    let ghcn: Vec<Reading> = (0..10)
        .map(|i| if i == 1 || i == 5 { None } else { Some(0.1 * i as f64 + 0.05) })
        .collect();
    let mut crutem: Vec<Reading> = vec![None; 10];
    crutem[0] = Some(-0.2);
    crutem[9] = Some(0.7);

    series(
        years,
        vec![("giss", giss), ("ghcn", ghcn), ("crutem", crutem)],
    )
}

pub fn series(years: Vec<i32>, channels: Vec<(&str, Vec<Reading>)>) -> TimeSeries {
    let channels: BTreeMap<String, Vec<Reading>> = channels
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    TimeSeries::new(years, channels).expect("valid fixture")
}
