/// Data layer: core types, loading, cleaning, and statistics.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → QuestionnaireDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────┐
///   │ QuestionnaireDataset │  Vec<Response>, ordinal = position
///   └──────────────────────┘
///        │
///        ├── filter     drop rows with a malformed email (new table)
///        ├── impute     fill missing answers with the row mean (in place)
///        ├── score      floored mean per row → score column (in place)
///        ├── histogram  age counts per bin
///        ├── cohort     mean answers per (gender, age > threshold)
///        └── export     write records back out as JSON
/// ```

pub mod cohort;
pub mod export;
pub mod filter;
pub mod histogram;
pub mod impute;
pub mod loader;
pub mod model;
pub mod score;
