use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::config::DashboardConfig;
use crate::data::filter::{self, DerivedView, FilterState, active_filter_count};
use crate::data::model::{Dataset, DatasetDescriptor, Row};
use crate::data::options::toggle_value;
use crate::error::DashboardError;
use crate::pagination::{PageItem, PageSlice, Paginator, page_numbers};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// A dataset load that has been requested but not applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub descriptor: DatasetDescriptor,
}

/// Headline numbers shown above the table.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_records: usize,
    pub filtered_records: usize,
    pub active_filters: usize,
    /// Share of records that survive, in percent. 0 without data.
    pub filter_efficiency: f64,
    /// Options offered across all filter columns.
    pub total_options: usize,
    pub last_recompute: Duration,
}

/// The full filter/search/pagination state, independent of rendering.
///
/// Every command that can change which rows survive recomputes the derived
/// view immediately and puts the cursor back on page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// Loaded dataset (None until the first load completes).
    dataset: Option<Dataset>,

    /// Per-column filter selections. Keys are always columns of `dataset`.
    filters: FilterState,

    search_term: String,

    /// 1-based.
    current_page: usize,

    paginator: Paginator,

    /// Filtered rows and faceted options (cached).
    view: DerivedView,

    /// Whether a dataset load is in flight.
    loading: bool,

    /// Dataset catalog.
    datasets: Vec<DatasetDescriptor>,

    /// Name of the dataset being shown or loaded.
    current_dataset: Option<String>,

    /// Bumped on every load request; older outcomes are discarded.
    generation: u64,

    /// Status / error message shown in the UI.
    status_message: Option<String>,

    last_recompute: Duration,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(&DashboardConfig::default())
    }
}

impl DashboardState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            dataset: None,
            filters: FilterState::new(),
            search_term: String::new(),
            current_page: 1,
            paginator: Paginator::new(config.page_size, config.visible_rows),
            view: DerivedView::default(),
            loading: false,
            datasets: config.datasets.clone(),
            current_dataset: None,
            generation: 0,
            status_message: None,
            last_recompute: Duration::ZERO,
        }
    }

    // -- Commands ----------------------------------------------------------

    /// Replace the accepted values of `column`.
    pub fn set_filter<I>(&mut self, column: &str, values: I) -> Result<(), DashboardError>
    where
        I: IntoIterator<Item = i64>,
    {
        self.ensure_column(column)?;
        let values: BTreeSet<i64> = values.into_iter().collect();
        log::debug!("Filter {column} = {values:?}, resetting page to 1");
        self.filters.insert(column.to_string(), values);
        self.current_page = 1;
        self.refilter();
        Ok(())
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: i64) -> Result<(), DashboardError> {
        self.ensure_column(column)?;
        let next = toggle_value(self.filter(column).unwrap_or(&BTreeSet::new()), value);
        self.set_filter(column, next)
    }

    /// Drop every filter.
    pub fn clear_all_filters(&mut self) {
        log::debug!("Clearing filters, resetting page to 1");
        self.filters.clear();
        self.current_page = 1;
        self.refilter();
    }

    /// Replace the search term; an empty term disables text search.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        log::debug!("Search term {:?}, resetting page to 1", self.search_term);
        self.current_page = 1;
        self.refilter();
    }

    /// Ingest a loaded dataset, dropping filters and search from the last one.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!(
            "Loaded dataset '{}': {} rows with columns {:?}",
            dataset.name,
            dataset.len(),
            dataset.columns
        );
        self.current_dataset = Some(dataset.name.clone());
        self.dataset = Some(dataset);
        self.filters.clear();
        self.search_term.clear();
        self.current_page = 1;
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Move to `page`. Out-of-range pages are refused and change nothing.
    pub fn set_page(&mut self, page: usize) -> bool {
        let total = self.total_pages();
        if !self.paginator.is_valid_page(page, self.filtered_len()) {
            log::debug!("Page navigation blocked: page={page}, total={total}");
            return false;
        }
        log::debug!("Page {} -> {page}", self.current_page);
        self.current_page = page;
        true
    }

    /// Start loading the catalog entry called `name`.
    pub fn switch_dataset(&mut self, name: &str) -> Result<LoadTicket, DashboardError> {
        let descriptor = self
            .datasets
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownDataset(name.to_string()))?;
        Ok(self.begin_load(descriptor))
    }

    /// Enter the loading state for `descriptor`. Derived views stay empty
    /// until [`finish_load`](Self::finish_load) applies the matching outcome.
    pub fn begin_load(&mut self, descriptor: DatasetDescriptor) -> LoadTicket {
        self.generation += 1;
        log::info!("Loading {descriptor} (generation {})", self.generation);
        self.current_dataset = Some(descriptor.name.clone());
        self.loading = true;
        self.filters.clear();
        self.search_term.clear();
        self.current_page = 1;
        self.status_message = None;
        self.refilter();
        LoadTicket {
            generation: self.generation,
            descriptor,
        }
    }

    /// Apply a finished load. Returns `false` when the outcome belongs to a
    /// superseded request and was dropped.
    ///
    /// On failure the previously loaded rows (if any) come back into view.
    pub fn finish_load(&mut self, generation: u64, result: anyhow::Result<Dataset>) -> bool {
        if generation != self.generation || !self.loading {
            log::debug!(
                "Discarding load outcome of generation {generation} (current {})",
                self.generation
            );
            return false;
        }
        match result {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.current_dataset = self.dataset.as_ref().map(|d| d.name.clone());
                self.loading = false;
                self.refilter();
            }
        }
        true
    }

    /// Add a catalog entry, replacing one with the same name.
    pub fn add_dataset(&mut self, descriptor: DatasetDescriptor) {
        match self.datasets.iter_mut().find(|d| d.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.datasets.push(descriptor),
        }
    }

    // -- Derived state -----------------------------------------------------

    fn ensure_column(&self, column: &str) -> Result<(), DashboardError> {
        match &self.dataset {
            Some(ds) if ds.has_column(column) => Ok(()),
            _ => Err(DashboardError::InvalidColumn(column.to_string())),
        }
    }

    /// Recompute the derived view after any change to rows, filters or search.
    fn refilter(&mut self) {
        let ds = match &self.dataset {
            Some(ds) if !self.loading => ds,
            _ => {
                self.view = DerivedView::default();
                return;
            }
        };
        let started = Instant::now();
        self.view = filter::recompute(ds, &self.filters, &self.search_term);
        self.last_recompute = started.elapsed();
        log::debug!(
            "Recomputed view: {} of {} rows, {} options in {:?}",
            self.view.filtered.len(),
            ds.len(),
            self.view.total_options(),
            self.last_recompute
        );
    }

    // -- Accessors ---------------------------------------------------------

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Filterable columns of the loaded dataset.
    pub fn columns(&self) -> &[String] {
        self.dataset.as_ref().map(|d| d.columns.as_slice()).unwrap_or(&[])
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter(&self, column: &str) -> Option<&BTreeSet<i64>> {
        self.filters.get(column)
    }

    pub fn has_active_filters(&self) -> bool {
        active_filter_count(&self.filters) > 0
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn datasets(&self) -> &[DatasetDescriptor] {
        &self.datasets
    }

    pub fn current_dataset(&self) -> Option<&str> {
        self.current_dataset.as_deref()
    }

    pub fn filtered_len(&self) -> usize {
        self.view.filtered.len()
    }

    #[cfg(test)]
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.rows_at(&self.view.filtered)
    }

    /// Faceted options for `column`; empty for unknown columns.
    pub fn options(&self, column: &str) -> &[i64] {
        self.view.options_for(column)
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages(self.filtered_len())
    }

    /// The current page as indices into the dataset's rows.
    pub fn current_page_slice(&self) -> PageSlice<'_, usize> {
        self.paginator.slice(&self.view.filtered, self.current_page)
    }

    /// Every row of the current page.
    pub fn current_page_rows(&self) -> Vec<&Row> {
        self.rows_at(self.current_page_slice().items)
    }

    pub fn page_numbers(&self) -> Vec<PageItem> {
        page_numbers(self.current_page, self.total_pages())
    }

    /// Rows for a list of dataset indices.
    fn rows_at(&self, indices: &[usize]) -> Vec<&Row> {
        match &self.dataset {
            Some(ds) => indices.iter().filter_map(|&i| ds.rows.get(i)).collect(),
            None => Vec::new(),
        }
    }

    pub fn stats(&self) -> DashboardStats {
        let total_records = if self.loading {
            0
        } else {
            self.dataset.as_ref().map_or(0, Dataset::len)
        };
        let filtered_records = self.filtered_len();
        let filter_efficiency = if total_records > 0 {
            filtered_records as f64 / total_records as f64 * 100.0
        } else {
            0.0
        };
        DashboardStats {
            total_records,
            filtered_records,
            active_filters: active_filter_count(&self.filters),
            filter_efficiency,
            total_options: self.view.total_options(),
            last_recompute: self.last_recompute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{modulo_dataset, sample_dataset};

    fn loaded() -> DashboardState {
        let mut state = DashboardState::default();
        state.set_dataset(sample_dataset());
        state
    }

    fn paged(rows: i64, page_size: usize, visible_rows: usize) -> DashboardState {
        let config = DashboardConfig {
            page_size,
            visible_rows,
            ..DashboardConfig::default()
        };
        let mut state = DashboardState::new(&config);
        state.set_dataset(modulo_dataset(rows, &[3, 4, 5]));
        state
    }

    fn numbers(rows: &[&Row]) -> Vec<i64> {
        rows.iter().map(|r| r.number).collect()
    }

    #[test]
    fn filter_selects_rows_and_narrows_other_facets() {
        let mut state = loaded();
        assert_eq!(state.options("mod4"), &[0, 1, 2, 3]);

        state.set_filter("mod3", [1]).unwrap();
        assert_eq!(numbers(&state.filtered_rows()), vec![1, 4]);
        assert_eq!(state.options("mod4"), &[0, 1]);
    }

    #[test]
    fn own_filter_leaves_own_facet_wide() {
        let mut state = loaded();
        state.set_filter("mod3", [1]).unwrap();
        state.set_filter("mod4", [1]).unwrap();
        assert_eq!(numbers(&state.filtered_rows()), vec![1]);
        assert_eq!(state.options("mod4"), &[0, 1]);
    }

    #[test]
    fn set_filter_is_idempotent() {
        let mut state = loaded();
        state.set_filter("mod3", [1, 2]).unwrap();
        let once = (state.filters().clone(), state.view.clone(), state.current_page());
        state.set_filter("mod3", [1, 2]).unwrap();
        let twice = (state.filters().clone(), state.view.clone(), state.current_page());
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_column_is_rejected_without_change() {
        let mut state = loaded();
        state.set_filter("mod3", [1]).unwrap();
        let before = state.clone();
        assert_eq!(
            state.set_filter("mod9", [1]),
            Err(DashboardError::InvalidColumn("mod9".into()))
        );
        assert_eq!(
            state.toggle_filter_value("number", 1),
            Err(DashboardError::InvalidColumn("number".into()))
        );
        assert_eq!(state, before);
        assert!(state.options("mod9").is_empty());
    }

    #[test]
    fn filter_before_any_dataset_is_rejected() {
        let mut state = DashboardState::default();
        assert!(state.set_filter("mod3", [1]).is_err());
        assert!(state.filtered_rows().is_empty());
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn toggling_values() {
        let mut state = loaded();
        state.toggle_filter_value("mod3", 0).unwrap();
        state.toggle_filter_value("mod3", 2).unwrap();
        assert_eq!(numbers(&state.filtered_rows()), vec![2, 3, 5]);
        state.toggle_filter_value("mod3", 0).unwrap();
        assert_eq!(numbers(&state.filtered_rows()), vec![2, 5]);
        assert_eq!(state.filter("mod3"), Some(&BTreeSet::from([2])));
    }

    #[test]
    fn clearing_filters_restores_all_rows() {
        let mut state = loaded();
        state.set_filter("mod3", [1]).unwrap();
        state.set_filter("mod5", [4]).unwrap();
        assert_eq!(state.filtered_len(), 1);
        assert!(state.has_active_filters());
        state.clear_all_filters();
        assert_eq!(state.filtered_len(), 5);
        assert!(state.filters().is_empty());
    }

    #[test]
    fn removing_a_restriction_never_shrinks_result() {
        let mut state = paged(90, 100, 20);
        state.set_filter("mod3", [0, 2]).unwrap();
        state.set_filter("mod4", [1]).unwrap();
        let narrow = state.filtered_len();
        state.set_filter("mod4", []).unwrap();
        assert!(state.filtered_len() >= narrow);
    }

    #[test]
    fn search_term_matches_values() {
        let rows = [1, 2, 3, 10, 20, 30, 100, 200]
            .iter()
            .zip(2..)
            .map(|(&v, n)| Row::new(n, vec![v]))
            .collect();
        let mut state = DashboardState::default();
        state.set_dataset(Dataset::new("values", vec!["v".into()], rows));

        state.set_search_term("10");
        let hits: Vec<i64> = state.filtered_rows().iter().map(|r| r.values[0]).collect();
        assert_eq!(hits, vec![10, 100]);
        assert_eq!(state.options("v"), &[10, 100]);

        state.set_search_term("");
        assert_eq!(state.filtered_len(), 8);
    }

    #[test]
    fn commands_reset_page() {
        let mut state = paged(50, 5, 2);

        assert!(state.set_page(4));
        state.set_filter("mod3", [0, 1, 2]).unwrap();
        assert_eq!(state.current_page(), 1);

        assert!(state.set_page(4));
        state.clear_all_filters();
        assert_eq!(state.current_page(), 1);

        assert!(state.set_page(4));
        state.set_search_term("1");
        assert_eq!(state.current_page(), 1);

        state.set_search_term("");
        assert!(state.set_page(4));
        state.set_dataset(modulo_dataset(50, &[3]));
        assert_eq!(state.current_page(), 1);

        assert!(state.set_page(4));
        state.switch_dataset("Small Dataset").unwrap();
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn out_of_range_pages_change_nothing() {
        let mut state = paged(50, 10, 5);
        assert_eq!(state.total_pages(), 5);
        assert!(state.set_page(2));
        let before = state.clone();

        assert!(!state.set_page(0));
        assert_eq!(state, before);
        assert!(!state.set_page(6));
        assert_eq!(state, before);
    }

    #[test]
    fn empty_result_still_has_page_one() {
        let mut state = loaded();
        state.set_search_term("999");
        assert_eq!(state.total_pages(), 1);
        assert!(state.set_page(1));
        assert!(!state.set_page(2));
        assert!(state.current_page_rows().is_empty());
        assert_eq!(state.page_numbers(), vec![PageItem::Page(1)]);
    }

    #[test]
    fn pages_reassemble_filtered_rows() {
        let mut state = paged(250, 40, 10);
        state.set_filter("mod5", [0, 1, 2]).unwrap();
        let all = numbers(&state.filtered_rows());

        let mut joined = Vec::new();
        for page in 1..=state.total_pages() {
            assert!(state.set_page(page));
            joined.extend(numbers(&state.current_page_rows()));
        }
        assert_eq!(joined, all);
    }

    #[test]
    fn visible_window_truncates_page() {
        let mut state = paged(25, 10, 4);
        assert!(state.set_page(3));
        let slice = state.current_page_slice();
        assert_eq!(slice.items.len(), 5);
        assert_eq!(numbers(&state.rows_at(slice.visible)), vec![21, 22, 23, 24]);
        assert!(slice.has_more_in_page());
    }

    #[test]
    fn switching_dataset_clears_and_loads() {
        let mut state = loaded();
        state.set_filter("mod3", [1]).unwrap();
        state.set_search_term("4");

        let ticket = state.switch_dataset("Large Dataset").unwrap();
        assert_eq!(ticket.descriptor.location, "dataset_large.csv");
        assert!(state.is_loading());
        assert!(state.filters().is_empty());
        assert_eq!(state.search_term(), "");
        assert!(state.filtered_rows().is_empty());
        assert!(state.options("mod3").is_empty());
        assert_eq!(state.stats().total_records, 0);

        let rows = modulo_dataset(10, &[350]).rows;
        let large = Dataset::new("Large Dataset", vec!["mod350".into()], rows);
        assert!(state.finish_load(ticket.generation, Ok(large)));
        assert!(!state.is_loading());
        assert_eq!(state.columns(), &["mod350".to_string()]);
        assert_eq!(state.current_dataset(), Some("Large Dataset"));
        assert_eq!(state.filtered_len(), 10);
    }

    #[test]
    fn stale_loads_are_discarded() {
        let mut state = DashboardState::default();
        let first = state.switch_dataset("Small Dataset").unwrap();
        let second = state.switch_dataset("Large Dataset").unwrap();
        assert!(second.generation > first.generation);

        assert!(!state.finish_load(first.generation, Ok(sample_dataset())));
        assert!(state.is_loading());
        assert!(state.dataset().is_none());

        let large = modulo_dataset(3, &[350]);
        assert!(state.finish_load(second.generation, Ok(large)));
        assert!(!state.is_loading());
        assert!(!state.finish_load(second.generation, Ok(sample_dataset())));
    }

    #[test]
    fn failed_load_keeps_previous_rows() {
        let mut state = loaded();
        let ticket = state.switch_dataset("Large Dataset").unwrap();
        assert!(state.filtered_rows().is_empty());

        assert!(state.finish_load(ticket.generation, Err(anyhow::anyhow!("boom"))));
        assert!(!state.is_loading());
        assert_eq!(state.filtered_len(), 5);
        assert!(state.status_message().unwrap().contains("boom"));
        assert_eq!(state.current_dataset(), Some("Small Dataset"));
    }

    #[test]
    fn failed_first_load_leaves_empty_state() {
        let mut state = DashboardState::default();
        let ticket = state.switch_dataset("Small Dataset").unwrap();
        state.finish_load(ticket.generation, Err(anyhow::anyhow!("missing file")));
        assert!(!state.is_loading());
        assert!(state.dataset().is_none());
        assert_eq!(state.current_dataset(), None);
        assert!(state.filtered_rows().is_empty());
    }

    #[test]
    fn unknown_dataset_is_rejected() {
        let mut state = loaded();
        let before = state.clone();
        assert_eq!(
            state.switch_dataset("Medium"),
            Err(DashboardError::UnknownDataset("Medium".into()))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn catalog_entries_replace_by_name() {
        let mut state = DashboardState::default();
        state.add_dataset(DatasetDescriptor::new("Small Dataset", "other.csv", &[]));
        state.add_dataset(DatasetDescriptor::new("mine", "mine.csv", &[]));
        assert_eq!(state.datasets().len(), 3);
        assert_eq!(state.datasets()[0].location, "other.csv");
    }

    #[test]
    fn stats_reflect_filters() {
        let mut state = loaded();
        state.set_filter("mod3", [1]).unwrap();
        state.set_filter("mod6", []).unwrap();
        let stats = state.stats();
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.filtered_records, 2);
        assert_eq!(stats.active_filters, 1);
        assert!((stats.filter_efficiency - 40.0).abs() < 1e-9);
        // mod3 {0,1,2} + mod4 {0,1} + mod5 {1,4} + mod6 {1,4}
        assert_eq!(stats.total_options, 9);
    }
}
