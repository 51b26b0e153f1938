use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Row};
use super::search::RowMatcher;

// ---------------------------------------------------------------------------
// Filter predicate: which values are accepted per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of accepted values.
/// If a column is absent or its set is empty, it means "no filter" (show all).
pub type FilterState = BTreeMap<String, BTreeSet<i64>>;

/// Number of columns whose accepted set actually restricts rows.
pub fn active_filter_count(filters: &FilterState) -> usize {
    filters.values().filter(|vals| !vals.is_empty()).count()
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything recomputed from `(rows, filters, search term)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    /// Indices into `Dataset::rows` that survive search and all filters.
    pub filtered: Vec<usize>,
    /// Column → sorted distinct values still reachable (faceted options).
    pub options: BTreeMap<String, Vec<i64>>,
}

impl DerivedView {
    /// Options for a column; unknown columns have none.
    pub fn options_for(&self, column: &str) -> &[i64] {
        self.options.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of option counts across all columns.
    pub fn total_options(&self) -> usize {
        self.options.values().map(Vec::len).sum()
    }
}

/// A non-empty filter resolved against the dataset's column positions.
struct ActiveFilter<'a> {
    /// `None` when the filter names a column the dataset does not have.
    col_idx: Option<usize>,
    accepted: &'a BTreeSet<i64>,
}

impl ActiveFilter<'_> {
    fn accepts(&self, row: &Row) -> bool {
        match self.col_idx.and_then(|i| row.value(i)) {
            Some(v) => self.accepted.contains(&v),
            None => false,
        }
    }
}

/// How a row fares against the active filters.
enum Verdict {
    Passes,
    /// Fails exactly one filter, on this column.
    FailsOnly(Option<usize>),
    FailsSeveral,
}

fn resolve_filters<'a>(dataset: &Dataset, filters: &'a FilterState) -> Vec<ActiveFilter<'a>> {
    filters
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .map(|(col, accepted)| ActiveFilter {
            col_idx: dataset.column_index(col),
            accepted,
        })
        .collect()
}

fn judge(row: &Row, filters: &[ActiveFilter<'_>]) -> Verdict {
    let mut failed = None;
    for f in filters {
        if !f.accepts(row) {
            if failed.is_some() {
                return Verdict::FailsSeveral;
            }
            failed = Some(f.col_idx);
        }
    }
    match failed {
        None => Verdict::Passes,
        Some(col) => Verdict::FailsOnly(col),
    }
}

// ---------------------------------------------------------------------------
// Recomputation
// ---------------------------------------------------------------------------

/// Derive filtered rows and faceted options from scratch.
///
/// A row survives when it matches the search term (if any) and, for every
/// column with a non-empty accepted set, its value is in that set.
///
/// Facets for a column `C`:
/// * No search term: distinct `C` values over all rows that pass every
///   filter *except* `C`'s own, so a selection can be widened again.
/// * Search term active: distinct `C` values over the filtered rows, which
///   already honour `C`'s own filter too. Under search a column therefore
///   cannot offer values its own filter excludes.
///
/// A row failing no filter feeds every facet; a row failing exactly one
/// feeds only that column's facet; anything else feeds none. One pass.
pub fn recompute(dataset: &Dataset, filters: &FilterState, search_term: &str) -> DerivedView {
    let n_cols = dataset.columns.len();
    if dataset.is_empty() || n_cols == 0 {
        return DerivedView::default();
    }

    let active = resolve_filters(dataset, filters);
    let mut matcher = RowMatcher::new(search_term);
    let searching = matcher.is_some();

    let mut facets: Vec<BTreeSet<i64>> = vec![BTreeSet::new(); n_cols];
    let mut filtered = Vec::new();

    for (idx, row) in dataset.rows.iter().enumerate() {
        if let Some(m) = matcher.as_mut() {
            if !m.matches(row) {
                continue;
            }
        }
        match judge(row, &active) {
            Verdict::Passes => {
                filtered.push(idx);
                for (facet, &v) in facets.iter_mut().zip(&row.values) {
                    facet.insert(v);
                }
            }
            Verdict::FailsOnly(Some(col)) if !searching => {
                if let Some(v) = row.value(col) {
                    facets[col].insert(v);
                }
            }
            Verdict::FailsOnly(_) | Verdict::FailsSeveral => {}
        }
    }

    let options = dataset
        .columns
        .iter()
        .zip(facets)
        .map(|(col, vals)| (col.clone(), vals.into_iter().collect()))
        .collect();

    DerivedView { filtered, options }
}
