use std::collections::BTreeSet;
use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("Dataset has no records.");
        return;
    }

    // Edit a copy; the state only ever receives whole selections.
    let universes = state.dataset.universes();
    let mut selection = state.selection().clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= multiselect(ui, "Year", &universes.years, &mut selection.years);
            changed |= multiselect(
                ui,
                "Seniority",
                &universes.seniorities,
                &mut selection.seniorities,
            );
            changed |= multiselect(ui, "Contract", &universes.contracts, &mut selection.contracts);
            changed |= multiselect(
                ui,
                "Company size",
                &universes.company_sizes,
                &mut selection.company_sizes,
            );
        });

    if changed {
        state.apply_selection(selection);
    }
}

/// One collapsible multi-select. Returns whether the selection changed.
fn multiselect<T: Ord + Clone + Display>(
    ui: &mut Ui,
    label: &str,
    universe: &BTreeSet<T>,
    selected: &mut BTreeSet<T>,
) -> bool {
    let mut changed = false;

    // Show count of selected / total in the header
    let header_text = format!("{label}  ({}/{})", selected.len(), universe.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = universe.clone();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for val in universe {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export filtered CSV…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        ui.separator();
        ui.label(RichText::new(state.source.display().to_string()).weak());

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("salaries-filtered.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_visible(&path) {
            Ok(_) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
