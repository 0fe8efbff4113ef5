use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{apply_filters, FilterSelection};
use crate::data::loader;
use crate::data::model::{SalaryDataset, SalaryRecord};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset loaded at startup; never replaced or mutated.
    pub dataset: SalaryDataset,

    /// File the dataset was read from.
    pub source: PathBuf,

    /// Current filter selection; replaced wholesale, never edited in place.
    selection: FilterSelection,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Metrics and chart tables for `visible_indices`.
    pub summary: DashboardSummary,

    /// Remote-work category colours, built from the whole dataset.
    pub remote_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: SalaryDataset, source: PathBuf) -> Self {
        let mut state = Self {
            selection: FilterSelection::all(dataset.universes()),
            remote_colors: ColorMap::new(dataset.records().iter().map(|r| r.remote.as_str())),
            dataset,
            source,
            visible_indices: Vec::new(),
            summary: DashboardSummary::default(),
            status_message: None,
        };
        state.refilter();
        state
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Replace the selection and recompute if it actually changed.
    pub fn apply_selection(&mut self, selection: FilterSelection) {
        let selection = selection.restricted_to(self.dataset.universes());
        if selection != self.selection {
            self.selection = selection;
            self.refilter();
        }
    }

    /// Recompute `visible_indices` and `summary` from one filtered view.
    pub fn refilter(&mut self) {
        let view = apply_filters(&self.dataset, &self.selection);
        self.summary = DashboardSummary::compute(&view);
        self.visible_indices = view.indices().to_vec();

        if view.is_empty() && !self.dataset.is_empty() {
            log::warn!("current filter selection matches no records");
        } else {
            log::debug!(
                "{} of {} records visible",
                self.visible_indices.len(),
                self.dataset.len()
            );
        }
    }

    /// Records of the current filtered view, in dataset order.
    pub fn visible_records(&self) -> impl Iterator<Item = &SalaryRecord> + '_ {
        let records = self.dataset.records();
        self.visible_indices.iter().map(move |&i| &records[i])
    }

    /// Write the current filtered view as CSV.
    pub fn export_visible(&self, path: &Path) -> Result<usize> {
        let written = loader::export_csv(path, self.visible_records())
            .with_context(|| format!("exporting to {}", path.display()))?;
        log::info!("Exported {written} records to {}", path.display());
        Ok(written)
    }
}
