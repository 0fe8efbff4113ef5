use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a synthetic salary dataset for trying out the dashboard.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", about)]
struct Cli {
    /// Output file; `.parquet` writes Parquet, anything else CSV.
    #[arg(default_value = "sample_salaries.csv")]
    output: PathBuf,

    /// Number of records to generate.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct Row {
    ano: i64,
    senioridade: &'static str,
    contrato: &'static str,
    tamanho_empresa: &'static str,
    cargo: &'static str,
    salario: f64,
    usd: f64,
    remoto: &'static str,
    residencia_iso3: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick from `(value, weight)` pairs.
    fn weighted<T: Copy>(&mut self, choices: &[(T, f64)]) -> T {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for &(value, weight) in choices {
            if target < weight {
                return value;
            }
            target -= weight;
        }
        choices[choices.len() - 1].0
    }
}

const YEARS: [(i64, f64); 5] = [
    (2020, 0.5),
    (2021, 1.0),
    (2022, 2.0),
    (2023, 3.0),
    (2024, 3.5),
];
const SENIORITY: [(&str, f64, f64); 4] = [
    // (label, weight, salary multiplier)
    ("junior", 1.0, 0.6),
    ("pleno", 2.0, 1.0),
    ("senior", 3.0, 1.4),
    ("executivo", 0.5, 2.0),
];
const CONTRACTS: [(&str, f64); 4] = [
    ("integral", 8.0),
    ("contrato", 1.0),
    ("freelancer", 0.5),
    ("parcial", 0.5),
];
const COMPANY_SIZES: [(&str, f64); 3] = [("pequena", 1.0), ("media", 6.0), ("grande", 2.0)];
const TITLES: [(&str, f64, f64); 8] = [
    // (title, weight, base USD salary)
    ("Data Scientist", 5.0, 140_000.0),
    ("Data Engineer", 5.0, 145_000.0),
    ("Data Analyst", 4.0, 100_000.0),
    ("Machine Learning Engineer", 3.0, 180_000.0),
    ("Analytics Engineer", 1.0, 150_000.0),
    ("Research Scientist", 0.5, 185_000.0),
    ("Data Architect", 0.5, 160_000.0),
    ("BI Analyst", 1.0, 90_000.0),
];
const REMOTE: [(&str, f64); 3] = [("presencial", 5.0), ("remoto", 4.0), ("hibrido", 1.0)];
const COUNTRIES: [(&str, f64, f64); 6] = [
    // (iso3, weight, local currency per USD)
    ("USA", 10.0, 1.0),
    ("GBR", 1.0, 0.8),
    ("CAN", 1.0, 0.75),
    ("DEU", 0.8, 1.5),
    ("BRA", 0.5, 5.0),
    ("IND", 0.5, 83.0),
];

fn pay_level(iso3: &str) -> f64 {
    match iso3 {
        "USA" => 1.0,
        "CAN" | "GBR" => 0.75,
        "DEU" => 0.7,
        "BRA" => 0.35,
        _ => 0.3,
    }
}

fn generate(rows: usize, seed: u64) -> Vec<Row> {
    let mut rng = SimpleRng::new(seed);
    let seniority: Vec<((&str, f64), f64)> = SENIORITY
        .iter()
        .map(|&(s, w, m)| ((s, m), w))
        .collect();
    let titles: Vec<((&str, f64), f64)> = TITLES.iter().map(|&(t, w, b)| ((t, b), w)).collect();
    let countries: Vec<((&str, f64), f64)> = COUNTRIES
        .iter()
        .map(|&(c, w, fx)| ((c, fx), w))
        .collect();

    (0..rows)
        .map(|_| {
            let ano = rng.weighted(&YEARS);
            let (senioridade, multiplier) = rng.weighted(&seniority);
            let (cargo, base) = rng.weighted(&titles);
            let (residencia_iso3, fx) = rng.weighted(&countries);
            let drift = 1.0 + 0.04 * (ano - 2020) as f64;
            let usd = (base * multiplier * pay_level(residencia_iso3) * drift
                * rng.gauss(1.0, 0.15).max(0.3))
            .round();

            Row {
                ano,
                senioridade,
                contrato: rng.weighted(&CONTRACTS),
                tamanho_empresa: rng.weighted(&COMPANY_SIZES),
                cargo,
                salario: (usd * fx).round(),
                usd,
                remoto: rng.weighted(&REMOTE),
                residencia_iso3,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let text =
        |f: fn(&Row) -> &'static str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("ano", DataType::Int64, false),
        Field::new("senioridade", DataType::Utf8, false),
        Field::new("contrato", DataType::Utf8, false),
        Field::new("tamanho_empresa", DataType::Utf8, false),
        Field::new("cargo", DataType::Utf8, false),
        Field::new("salario", DataType::Float64, false),
        Field::new("usd", DataType::Float64, false),
        Field::new("remoto", DataType::Utf8, false),
        Field::new("residencia_iso3", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(text(|r| r.senioridade)),
            Arc::new(text(|r| r.contrato)),
            Arc::new(text(|r| r.tamanho_empresa)),
            Arc::new(text(|r| r.cargo)),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.salario).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.usd).collect::<Vec<_>>())),
            Arc::new(text(|r| r.remoto)),
            Arc::new(text(|r| r.residencia_iso3)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let rows = generate(cli.rows, cli.seed);

    let is_parquet = cli
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&cli.output, &rows)?;
    } else {
        write_csv(&cli.output, &rows)?;
    }

    println!("Wrote {} salary records to {}", rows.len(), cli.output.display());
    Ok(())
}
