/// Data layer: core types, ingest, loading, filtering and export.
///
/// Architecture:
/// ```text
///  raw GHCN / GISTEMP / CRUTEM files
///        │
///        ▼
///   ┌──────────┐
///   │  ingest   │  annual anomalies → .json / .csv
///   └──────────┘
///        │
///        ▼
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TimeSeries
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ TimeSeries  │  years + aligned channels
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusive year range → filtered view
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered view → CSV rows / JSON payload
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod ingest;
pub mod loader;
pub mod model;
