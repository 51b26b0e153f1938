use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::pagination::{PageItem, can_go_next, can_go_previous};
use crate::state::DashboardState;

const ROW_HEIGHT: f32 = 20.0;

/// "mod3" → "Mod3", "rowCount" → "Row Count".
pub fn column_label(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Data table (central panel)
// ---------------------------------------------------------------------------

/// Render the visible window of the current page plus pagination controls.
pub fn data_table(ui: &mut Ui, state: &mut DashboardState) {
    let slice = state.current_page_slice();
    let (start, visible_end) = (slice.start, slice.visible_end());
    let page_len = slice.end - slice.start;
    let has_more = slice.has_more_in_page();
    let (total, current_page) = (slice.total, slice.page);
    let page_rows = state.current_page_rows();
    let visible = &page_rows[..slice.visible.len()];
    let total_pages = state.total_pages();
    let window = state.paginator().visible_rows();
    let term = state.search_term().to_string();
    let labels: Vec<String> = state.columns().iter().map(|c| column_label(c)).collect();

    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Data Table");
        ui.label(format!(
            "Showing {}-{} of {} results (Page {} of {})",
            if visible.is_empty() { start } else { start + 1 },
            visible_end,
            total,
            current_page,
            total_pages
        ));
    });

    if visible.is_empty() {
        ui.add_space(16.0);
        ui.vertical_centered(|ui: &mut Ui| {
            if term.is_empty() {
                ui.heading("No data available");
                ui.label("Try changing your filters");
            } else {
                ui.heading("No results found");
                ui.label("Try adjusting your search or filters");
            }
        });
    } else {
        let needle = term.to_lowercase();
        let highlight = |text: String| {
            if !needle.is_empty() && text.contains(needle.as_str()) {
                RichText::new(text).background_color(Color32::from_rgb(254, 240, 138))
            } else {
                RichText::new(text)
            }
        };

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .max_scroll_height(ROW_HEIGHT * 24.0)
            .column(Column::initial(50.0).at_least(40.0))
            .column(Column::initial(100.0).at_least(60.0))
            .columns(Column::initial(90.0).at_least(50.0).clip(true), labels.len())
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Number");
                });
                for label in &labels {
                    header.col(|ui| {
                        ui.strong(label);
                    });
                }
            })
            .body(|mut body| {
                for (offset, row) in visible.iter().enumerate() {
                    body.row(ROW_HEIGHT, |mut cells| {
                        cells.col(|ui| {
                            ui.label(RichText::new((start + offset + 1).to_string()).weak());
                        });
                        cells.col(|ui| {
                            ui.label(highlight(row.number.to_string()));
                        });
                        for value in &row.values {
                            cells.col(|ui| {
                                ui.label(highlight(value.to_string()));
                            });
                        }
                    });
                }
            });
    }

    if has_more {
        ui.label(
            RichText::new(format!(
                "Showing {} of {} rows on this page (first {window} rows rendered)",
                visible.len(),
                page_len
            ))
            .small()
            .weak(),
        );
    }

    if total_pages > 1 {
        ui.separator();
        pagination_controls(ui, state, current_page, total_pages);
    }
}

fn pagination_controls(ui: &mut Ui, state: &mut DashboardState, current: usize, total: usize) {
    let mut target = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Page {current} of {total} ({} total results, {} per page)",
            state.filtered_len(),
            state.paginator().page_size()
        ));
        ui.separator();

        let back = can_go_previous(current);
        let forward = can_go_next(current, total);
        if ui.add_enabled(back, egui::Button::new("⏮")).on_hover_text("First page").clicked() {
            target = Some(1);
        }
        if ui.add_enabled(back, egui::Button::new("◀")).on_hover_text("Previous page").clicked() {
            target = Some(current - 1);
        }
        for item in state.page_numbers() {
            match item {
                PageItem::Page(n) => {
                    if ui
                        .selectable_label(n == current, n.to_string())
                        .on_hover_text(format!("Go to page {n}"))
                        .clicked()
                        && n != current
                    {
                        target = Some(n);
                    }
                }
                PageItem::Ellipsis => {
                    ui.label("...");
                }
            }
        }
        if ui.add_enabled(forward, egui::Button::new("▶")).on_hover_text("Next page").clicked() {
            target = Some(current + 1);
        }
        if ui.add_enabled(forward, egui::Button::new("⏭")).on_hover_text("Last page").clicked() {
            target = Some(total);
        }
    });

    if let Some(page) = target {
        state.set_page(page);
    }
}
