mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use app::SalaryDashboardApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

const WINDOW_TITLE: &str = "Salary Dashboard – Data Careers";

/// Interactive dashboard of data-industry salaries.
#[derive(Debug, Parser)]
#[command(name = "salary-dashboard", version, about)]
struct Cli {
    /// Dataset to load (.csv, .json or .parquet).
    #[arg(env = "SALARY_DASHBOARD_DATA", default_value = "dados-imersão-final.csv")]
    data: PathBuf,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1400.0)]
    width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    height: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // A dataset that cannot be loaded is fatal: no window is opened.
    let dataset = data::loader::load_file(&cli.data)
        .with_context(|| format!("loading dataset {}", cli.data.display()))?;
    log::info!(
        "Loaded {} records from {}",
        dataset.len(),
        cli.data.display()
    );
    let state = AppState::new(dataset, cli.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([cli.width, cli.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(SalaryDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running dashboard: {e}"))
}
