/// Data layer: survey tables, station layout, loading, and pod filtering.
///
/// Architecture:
/// ```text
///  survey .csv / .json / .parquet      layout .csv
///        │                                  │
///        ▼                                  ▼
///   ┌──────────┐                      ┌──────────┐
///   │  loader   │  parse → SurveyTable │  loader   │ parse → StationLayout
///   └──────────┘                      └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected pods → visible point indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
