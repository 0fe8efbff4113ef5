use std::collections::BTreeSet;

use super::model::{SalaryDataset, SalaryRecord, Universes};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state. Each set is a subset of the matching
/// universe; an empty set selects nothing (it is not "no filter").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub seniorities: BTreeSet<String>,
    pub contracts: BTreeSet<String>,
    pub company_sizes: BTreeSet<String>,
}

impl FilterSelection {
    /// Everything selected, i.e. show every record.
    pub fn all(universes: &Universes) -> Self {
        FilterSelection {
            years: universes.years.clone(),
            seniorities: universes.seniorities.clone(),
            contracts: universes.contracts.clone(),
            company_sizes: universes.company_sizes.clone(),
        }
    }

    /// Drop any selected value that is not part of the universe.
    pub fn restricted_to(mut self, universes: &Universes) -> Self {
        self.years.retain(|v| universes.years.contains(v));
        self.seniorities.retain(|v| universes.seniorities.contains(v));
        self.contracts.retain(|v| universes.contracts.contains(v));
        self.company_sizes
            .retain(|v| universes.company_sizes.contains(v));
        self
    }

    /// Whether some column has nothing selected.
    pub fn selects_nothing(&self) -> bool {
        self.years.is_empty()
            || self.seniorities.is_empty()
            || self.contracts.is_empty()
            || self.company_sizes.is_empty()
    }

    /// Whether a record passes all four column predicates.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        self.years.contains(&record.year)
            && self.seniorities.contains(&record.seniority)
            && self.contracts.contains(&record.contract)
            && self.company_sizes.contains(&record.company_size)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the records passing the current selection
// ---------------------------------------------------------------------------

/// Borrowed view over the records of a dataset that passed a selection,
/// kept in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: &'a [SalaryRecord],
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a SalaryRecord> + '_ {
        self.indices.iter().map(|&i| &self.records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of records that pass all four column filters.
///
/// A record passes when its year, seniority, contract and company size are
/// each in the selected set for that column. An empty set for any column
/// therefore hides everything.
pub fn filtered_indices(dataset: &SalaryDataset, selection: &FilterSelection) -> Vec<usize> {
    if dataset.is_empty() || selection.selects_nothing() {
        return Vec::new();
    }

    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Filter the dataset into a [`FilteredView`].
///
/// The selection is restricted to the dataset universes first.
pub fn apply_filters<'a>(
    dataset: &'a SalaryDataset,
    selection: &FilterSelection,
) -> FilteredView<'a> {
    let selection = selection.clone().restricted_to(dataset.universes());
    let indices = filtered_indices(dataset, &selection);
    FilteredView {
        records: dataset.records(),
        indices,
    }
}
