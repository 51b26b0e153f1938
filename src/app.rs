use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::loader::{LoadOutcome, spawn_load};
use crate::data::model::{Dataset, DatasetDescriptor};
use crate::debounce::Debouncer;
use crate::state::{DashboardState, LoadTicket};
use crate::ui::{panels, table};

/// How often to check on a running load.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FacetExplorerApp {
    pub state: DashboardState,

    /// Text currently in the search box; applied through `search_debounce`.
    pub search_input: String,
    pub search_debounce: Debouncer<String>,

    /// Per-column query typed into a filter dropdown.
    pub option_queries: HashMap<String, String>,

    /// Generation and channel of the load in flight.
    pending_load: Option<(u64, Receiver<LoadOutcome>)>,
}

impl FacetExplorerApp {
    pub fn new(config: &DashboardConfig) -> Self {
        let mut app = Self {
            state: DashboardState::new(config),
            search_input: String::new(),
            search_debounce: Debouncer::new(config.search_debounce()),
            option_queries: HashMap::new(),
            pending_load: None,
        };
        app.switch_dataset(&config.default_dataset);
        app
    }

    /// Load a catalog entry in the background.
    pub fn switch_dataset(&mut self, name: &str) {
        match self.state.switch_dataset(name) {
            Ok(ticket) => self.start_load(ticket),
            Err(e) => log::error!("{e}"),
        }
    }

    /// Register a CSV picked from disk and load it.
    pub fn open_file(&mut self, path: &Path) {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let descriptor = DatasetDescriptor {
            name,
            location: path.display().to_string(),
            columns: Vec::new(),
        };
        self.state.add_dataset(descriptor.clone());
        let ticket = self.state.begin_load(descriptor);
        self.start_load(ticket);
    }

    /// Queue a search term change; only the last one in a burst is applied.
    pub fn search_input_changed(&mut self) {
        self.search_debounce
            .schedule(self.search_input.clone(), Instant::now());
    }

    fn start_load(&mut self, ticket: LoadTicket) {
        // Replacing the receiver drops any older in-flight load.
        let generation = ticket.generation;
        self.pending_load = Some((generation, spawn_load(ticket.descriptor, generation)));
        self.search_input.clear();
        self.search_debounce.cancel();
        self.option_queries.clear();
    }

    fn poll_load(&mut self, ctx: &egui::Context) {
        let Some((generation, rx)) = &self.pending_load else {
            return;
        };
        let generation = *generation;
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending_load = None;
                self.apply_load(outcome.generation, outcome.result);
            }
            Err(TryRecvError::Empty) => ctx.request_repaint_after(LOAD_POLL_INTERVAL),
            Err(TryRecvError::Disconnected) => {
                self.pending_load = None;
                self.apply_load(generation, Err(anyhow::anyhow!("loader thread exited")));
            }
        }
    }

    /// Hand a load outcome to the state and bring the search box back in line
    /// with the search term that is actually applied.
    fn apply_load(&mut self, generation: u64, result: anyhow::Result<Dataset>) {
        if self.state.finish_load(generation, result) {
            self.search_debounce.cancel();
            self.search_input = self.state.search_term().to_string();
        }
    }

    fn poll_search(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(term) = self.search_debounce.poll(now) {
            self.state.set_search_term(term);
        } else if let Some(wait) = self.search_debounce.time_remaining(now) {
            ctx.request_repaint_after(wait);
        }
    }
}

impl eframe::App for FacetExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load(ctx);
        self.poll_search(ctx);

        // ---- Top panel: menu bar, dataset picker, search ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::filter_panel(ui, self);
            });

        // ---- Central panel: stats + table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.is_loading() {
                ui.centered_and_justified(|ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!(
                            "Loading {}...",
                            self.state.current_dataset().unwrap_or("dataset").to_lowercase()
                        ));
                    });
                });
                return;
            }
            panels::stats_bar(ui, &self.state);
            ui.separator();
            table::data_table(ui, &mut self.state);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::sample_dataset;

    fn instant_search_app() -> (FacetExplorerApp, u64) {
        let config = DashboardConfig {
            search_debounce_ms: 0,
            ..DashboardConfig::default()
        };
        let mut app = FacetExplorerApp::new(&config);
        let generation = app
            .pending_load
            .take()
            .map(|(generation, _)| generation)
            .unwrap();
        (app, generation)
    }

    #[test]
    fn search_typed_during_load_is_cleared_from_the_box() {
        let (mut app, generation) = instant_search_app();
        assert!(app.state.is_loading());

        app.search_input = "4".to_string();
        app.search_input_changed();
        app.poll_search(&egui::Context::default());

        app.apply_load(generation, Ok(sample_dataset()));
        assert_eq!(app.search_input, app.state.search_term());
        assert_eq!(app.state.search_term(), "");
        assert!(!app.search_debounce.is_pending());
        assert_eq!(app.state.filtered_len(), 5);
    }

    #[test]
    fn stale_load_leaves_search_box_alone() {
        let (mut app, generation) = instant_search_app();
        app.apply_load(generation, Ok(sample_dataset()));

        app.search_input = "3".to_string();
        app.search_input_changed();
        app.apply_load(generation, Ok(sample_dataset()));
        assert_eq!(app.search_input, "3");
        assert!(app.search_debounce.is_pending());
    }
}
