use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::app::FacetExplorerApp;
use crate::data::filter::active_filter_count;
use crate::data::options::{OptionList, selection_label, toggle_select_all};
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the menu, dataset picker and search box.
pub fn top_bar(ui: &mut Ui, app: &mut FacetExplorerApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
        });

        ui.separator();

        // ---- Dataset selector ----
        ui.label("Dataset");
        let current = app.state.current_dataset().unwrap_or_default().to_string();
        let names: Vec<String> = app.state.datasets().iter().map(|d| d.name.clone()).collect();
        let mut picked = None;
        egui::ComboBox::from_id_salt("dataset")
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for name in &names {
                    if ui.selectable_label(current == *name, name).clicked() && current != *name {
                        picked = Some(name.clone());
                    }
                }
            });
        if let Some(name) = picked {
            app.switch_dataset(&name);
        }

        ui.separator();

        // ---- Search ----
        let editable = !app.state.is_loading();
        let response = ui.add_enabled(
            editable,
            egui::TextEdit::singleline(&mut app.search_input)
                .hint_text("Search across all columns...")
                .desired_width(240.0),
        );
        if response.changed() {
            app.search_input_changed();
        }
        if editable && !app.search_input.is_empty() && ui.small_button("✖").clicked() {
            app.search_input.clear();
            app.search_input_changed();
        }
        if app.search_debounce.is_pending() {
            ui.spinner();
        }
        if !app.state.search_term().is_empty() {
            ui.label(format!(
                "Found {} results for \"{}\"",
                app.state.filtered_len(),
                app.state.search_term()
            ));
        }

        if let Some(msg) = app.state.status_message() {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render one multi-select per filterable column.
pub fn filter_panel(ui: &mut Ui, app: &mut FacetExplorerApp) {
    ui.heading("Filters");
    ui.separator();

    if app.state.dataset().is_none() || app.state.is_loading() {
        ui.label("No dataset loaded.");
        return;
    }

    let columns = app.state.columns().to_vec();
    ui.label(format!(
        "{} filter columns, {} active",
        columns.len(),
        active_filter_count(app.state.filters())
    ));
    if app.state.has_active_filters() && ui.button("Clear All Filters").clicked() {
        app.state.clear_all_filters();
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                column_filter(ui, app, col);
            }
        });
}

fn column_filter(ui: &mut Ui, app: &mut FacetExplorerApp, col: &str) {
    let options = app.state.options(col).to_vec();
    let selected = app.state.filter(col).cloned().unwrap_or_default();
    let header = format!("{col}: {}", selection_label(&selected, "Select values"));

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(col)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let query = app.option_queries.entry(col.to_string()).or_default();
            ui.add(egui::TextEdit::singleline(query).hint_text("Search..."));
            let list = OptionList::new(&options, query);

            // Select all / clear
            let mut next = None;
            ui.horizontal(|ui: &mut Ui| {
                let all_label = if selected.len() == list.total() {
                    "Deselect All"
                } else {
                    "Select All"
                };
                if ui.small_button(all_label).clicked() {
                    next = Some(toggle_select_all(&selected, &list.matches));
                }
                if !selected.is_empty() && ui.small_button("Clear").clicked() {
                    next = Some(Default::default());
                }
            });

            let mut toggled = None;
            if list.total() == 0 {
                ui.label(RichText::new("No options found").weak());
            }
            for &value in list.visible() {
                let mut checked = selected.contains(&value);
                if ui.checkbox(&mut checked, value.to_string()).changed() {
                    toggled = Some(value);
                }
            }
            if list.has_more() {
                ui.label(
                    RichText::new(format!(
                        "Showing first {} of {} options. Use search to narrow down results",
                        list.visible().len(),
                        list.total()
                    ))
                    .small()
                    .weak(),
                );
            }
            if !selected.is_empty() {
                ui.label(
                    RichText::new(format!("{} of {} selected", selected.len(), options.len()))
                        .small(),
                );
            }

            let result = match (next, toggled) {
                (Some(values), _) => app.state.set_filter(col, values),
                (None, Some(value)) => app.state.toggle_filter_value(col, value),
                (None, None) => Ok(()),
            };
            if let Err(e) = result {
                log::warn!("{e}");
            }
        });
}

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

pub fn stats_bar(ui: &mut Ui, state: &DashboardState) {
    let stats = state.stats();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        stat(ui, "Total Records", stats.total_records.to_string());
        stat(ui, "Filtered Records", stats.filtered_records.to_string());
        stat(ui, "Active Filters", stats.active_filters.to_string());
        stat(ui, "Filter Efficiency", format!("{:.1}%", stats.filter_efficiency));
        stat(ui, "Filter Options", stats.total_options.to_string());
        stat(
            ui,
            "Filter Time",
            format!("{:.2}ms", stats.last_recompute.as_secs_f64() * 1000.0),
        );
    });
}

fn stat(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small());
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(app: &mut FacetExplorerApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        app.open_file(&path);
    }
}
