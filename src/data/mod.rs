/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ObservationTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop values outside the 2.5% / 97.5% quantiles
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  rolling mean, monthly averages (borrowed, per view)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
