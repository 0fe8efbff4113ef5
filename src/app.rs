use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{charts, metrics, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalaryDashboardApp {
    pub state: AppState,
}

impl SalaryDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalaryDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("🎲 Data Careers Salary Dashboard");
    ui.label(
        "Explore salaries in the data field over recent years. \
         Use the filters on the left to refine the analysis.",
    );
    ui.separator();

    ui.strong("Overall metrics (annual salary in USD)");
    metrics::metric_cards(ui, &state.summary.metrics);
    ui.separator();

    let summary = &state.summary;
    ui.heading("Charts");
    ui.columns(2, |cols: &mut [Ui]| {
        charts::top_titles_chart(&mut cols[0], &summary.top_titles);
        charts::histogram_chart(&mut cols[1], &summary.salary_histogram);
    });
    ui.add_space(12.0);
    ui.columns(2, |cols: &mut [Ui]| {
        charts::remote_donut(&mut cols[0], &summary.remote_counts, &state.remote_colors);
        charts::country_chart(&mut cols[1], &summary.country_means);
    });
    ui.separator();

    ui.heading("Detailed data");
    table::data_table(ui, state);
}
