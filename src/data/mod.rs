/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → IncidentDataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ IncidentDataset  │  Vec<IncidentRecord>, distinct values, year bounds
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  grouped sums → AggregateBundle
///   └───────────┘
/// ```

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
