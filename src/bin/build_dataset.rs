//! Build the dashboard dataset from the raw product files.
//!
//! ```text
//! build_dataset [--ghcn <monthly.dat> <stations.inv> <landmask.csv>]
//!               [--gistemp <monthly.csv>] [--crutem <summary.txt>]
//!               [--last-year <year>] [--out <file.json>]
//! ```
//!
//! Each product that fails is logged and left out; the run fails only when
//! none succeeds.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Datelike;

use climate_viewer::data::export::export_json_file;
use climate_viewer::data::ingest::{AnnualSeries, combine, crutem, ghcn, gistemp};

#[derive(Debug, Default)]
struct Args {
    ghcn: Option<(PathBuf, PathBuf, PathBuf)>,
    gistemp: Option<PathBuf>,
    crutem: Option<PathBuf>,
    last_year: Option<i32>,
    out: Option<PathBuf>,
}

fn path(raw: &mut dyn Iterator<Item = String>, flag: &str) -> Result<PathBuf> {
    raw.next()
        .map(PathBuf::from)
        .with_context(|| format!("{flag} needs a path"))
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(flag) = raw.next() {
        match flag.as_str() {
            "--ghcn" => {
                args.ghcn = Some((path(&mut raw, "--ghcn")?, path(&mut raw, "--ghcn")?, path(&mut raw, "--ghcn")?));
            }
            "--gistemp" => args.gistemp = Some(path(&mut raw, "--gistemp")?),
            "--crutem" => args.crutem = Some(path(&mut raw, "--crutem")?),
            "--out" => args.out = Some(path(&mut raw, "--out")?),
            "--last-year" => {
                let text = raw.next().context("--last-year needs a year")?;
                args.last_year = Some(text.parse().with_context(|| format!("'{text}' is not a year"))?);
            }
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    // The current year is still incomplete.
    let last_year = args.last_year.unwrap_or_else(|| chrono::Local::now().year() - 1);
    let out = args.out.clone().unwrap_or_else(|| PathBuf::from("climate_data.json"));

    let mut jobs: Vec<(&str, Box<dyn Fn() -> Result<AnnualSeries> + '_>)> = Vec::new();
    if let Some(path) = &args.gistemp {
        jobs.push(("giss", Box::new(move || gistemp::load_gistemp(path, last_year))));
    }
    if let Some(path) = &args.crutem {
        jobs.push(("crutem", Box::new(move || crutem::load_crutem(path, last_year))));
    }
    if let Some((dat, inv, mask)) = &args.ghcn {
        jobs.push(("ghcn", Box::new(move || ghcn::load_ghcn(dat, inv, mask, last_year))));
    }
    if jobs.is_empty() {
        bail!("nothing to build: pass at least one of --ghcn, --gistemp, --crutem");
    }

    let mut channels = Vec::new();
    for (key, job) in &jobs {
        log::info!("Transforming {key} data...");
        match job() {
            Ok(series) if series.is_empty() => log::warn!("{key}: no years between 1900 and {last_year}"),
            Ok(series) => channels.push((key.to_string(), series)),
            Err(e) => log::error!("{key} transformation failed: {e:#}"),
        }
    }
    if channels.is_empty() {
        bail!("no dataset could be built");
    }
    if channels.len() < jobs.len() {
        log::warn!("built {} of {} datasets", channels.len(), jobs.len());
    }

    let series = combine(channels)?;
    export_json_file(&out, &series)?;
    println!("Wrote {} years x {} channels to {}", series.len(), series.channels().len(), out.display());
    Ok(())
}
