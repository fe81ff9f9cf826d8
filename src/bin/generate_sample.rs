use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use climate_viewer::TimeSeries;
use climate_viewer::data::export::export_json_file;
use parquet::arrow::ArrowWriter;

/// Anomaly (°C vs 1951-1980) of a smooth warming curve: flat-ish until the
/// mid century, then roughly 0.18 °C per decade.
fn baseline(year: i32) -> f64 {
    let t = f64::from(year - 1880);
    -0.3 + 0.0004 * t + 0.000_055 * t * t
}

/// (key, noise level, offset, first year with data, years with no reading)
type ChannelSpec = (&'static str, f64, f64, i32, &'static [i32]);

const CHANNELS: [ChannelSpec; 3] = [
    ("giss", 0.08, 0.00, 1880, &[]),
    ("ghcn", 0.12, 0.05, 1890, &[1917, 1944, 1945]),
    ("crutem", 0.10, -0.03, 1880, &[2023, 2024]),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let years: Vec<i32> = (1880..=2024).collect();

    let channels: Vec<(&str, Vec<Option<f64>>)> = CHANNELS
        .iter()
        .map(|&(key, noise, offset, first_year, gaps)| {
            let values = years
                .iter()
                .map(|&year| {
                    // Draw for every year so each channel's noise stays stable
                    // when gaps change.
                    let value = baseline(year) + offset + rng.gauss(0.0, noise);
                    let present = year >= first_year && !gaps.contains(&year);
                    present.then(|| (value * 1000.0).round() / 1000.0)
                })
                .collect();
            (key, values)
        })
        .collect();

    // ---- JSON payload ----
    let series = TimeSeries::new(
        years.clone(),
        channels
            .iter()
            .map(|(key, values)| (key.to_string(), values.clone()))
            .collect::<BTreeMap<_, _>>(),
    )?;
    let json_path = "sample_climate.json";
    export_json_file(Path::new(json_path), &series)?;

    // ---- Parquet table ----
    let mut fields = vec![Field::new("year", DataType::Int32, false)];
    fields.extend(
        channels
            .iter()
            .map(|(key, _)| Field::new(*key, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<arrow::array::ArrayRef> = vec![Arc::new(Int32Array::from(years.clone()))];
    columns.extend(
        channels
            .iter()
            .map(|(_, values)| Arc::new(Float64Array::from(values.clone())) as arrow::array::ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let parquet_path = "sample_climate.parquet";
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} years x {} channels to {json_path} and {parquet_path}",
        years.len(),
        channels.len()
    );
    Ok(())
}
