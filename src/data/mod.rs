/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv (fallback) / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SurveyDataset (memoized in DatasetStore)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  per-column membership → filtered subset
///   └──────────┘
///        │
///        ├──────────────► export   (CSV of the subset)
///        ▼
///   ┌──────────┐
///   │  metrics  │  means, shares, mode, rankings → MetricSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  insight  │  MetricSet → ordered insight strings
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod insight;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod schema;
