use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 9] = [
    "Year",
    "Seniority",
    "Contract",
    "Company size",
    "Title",
    "Salary",
    "USD",
    "Remote",
    "Country",
];

/// Raw table of the records in the current filtered view.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    if state.visible_indices.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }

    let records = state.dataset.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(60.0), HEADERS.len() - 1)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, state.visible_indices.len(), |mut row| {
                let rec = &records[state.visible_indices[row.index()]];
                let cells = [
                    rec.year.to_string(),
                    rec.seniority.clone(),
                    rec.contract.clone(),
                    rec.company_size.clone(),
                    rec.job_title.clone(),
                    format!("{:.2}", rec.salary),
                    format!("{:.2}", rec.salary_usd),
                    rec.remote.clone(),
                    rec.residence_iso3.clone(),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
