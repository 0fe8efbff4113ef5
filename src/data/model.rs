use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SalaryRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single salary observation. Field renames match the column headers of
/// the source file so the same struct reads and writes CSV / JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "senioridade")]
    pub seniority: String,
    #[serde(rename = "contrato")]
    pub contract: String,
    #[serde(rename = "tamanho_empresa")]
    pub company_size: String,
    #[serde(rename = "cargo")]
    pub job_title: String,
    /// Salary in the local currency of the record.
    #[serde(rename = "salario")]
    pub salary: f64,
    /// Salary converted to USD; every aggregate uses this column.
    #[serde(rename = "usd")]
    pub salary_usd: f64,
    #[serde(rename = "remoto")]
    pub remote: String,
    #[serde(rename = "residencia_iso3")]
    pub residence_iso3: String,
}

/// Column headers every input file must provide, in export order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "ano",
    "senioridade",
    "contrato",
    "tamanho_empresa",
    "cargo",
    "salario",
    "usd",
    "remoto",
    "residencia_iso3",
];

// ---------------------------------------------------------------------------
// Universes – selectable values per filter column
// ---------------------------------------------------------------------------

/// For each filterable column the sorted set of distinct values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universes {
    pub years: BTreeSet<i32>,
    pub seniorities: BTreeSet<String>,
    pub contracts: BTreeSet<String>,
    pub company_sizes: BTreeSet<String>,
}

impl Universes {
    pub fn from_records(records: &[SalaryRecord]) -> Self {
        let mut universes = Universes::default();
        for rec in records {
            universes.years.insert(rec.year);
            if !universes.seniorities.contains(&rec.seniority) {
                universes.seniorities.insert(rec.seniority.clone());
            }
            if !universes.contracts.contains(&rec.contract) {
                universes.contracts.insert(rec.contract.clone());
            }
            if !universes.company_sizes.contains(&rec.company_size) {
                universes.company_sizes.insert(rec.company_size.clone());
            }
        }
        universes
    }
}

// ---------------------------------------------------------------------------
// SalaryDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with its pre-computed universes.
///
/// Fields are private: once built the dataset is never mutated.
#[derive(Debug, Clone)]
pub struct SalaryDataset {
    records: Vec<SalaryRecord>,
    universes: Universes,
}

impl SalaryDataset {
    /// Build the column universes from the loaded records.
    pub fn from_records(records: Vec<SalaryRecord>) -> Self {
        let universes = Universes::from_records(&records);
        SalaryDataset { records, universes }
    }

    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }

    pub fn universes(&self) -> &Universes {
        &self.universes
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
