/// Data layer: core types, loading, search and faceted filtering.
///
/// Architecture:
/// ```text
///   number,mod3,mod4,...  (.csv)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset   (worker thread, generation-tagged)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, ordered filterable columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  search + per-column predicates → filtered rows, facets
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod options;
pub mod search;
