use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{SalaryDataset, SalaryRecord, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}, column '{column}': {reason}")]
    Malformed {
        row: usize,
        column: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a salary dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the required columns
/// * `.json`    – `[{ "ano": 2024, "senioridade": "senior", ... }, ...]`
/// * `.parquet` – flat table with the required columns (recommended for
///   large exports)
pub fn load_file(path: &Path) -> Result<SalaryDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    Ok(SalaryDataset::from_records(records))
}

/// Fail with every required column absent from `present`.
fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !present.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

/// Reject values serde happily accepts but the dashboard cannot use.
fn validate(record: SalaryRecord, row: usize) -> Result<SalaryRecord> {
    let malformed = |column, reason: String| LoadError::Malformed { row, column, reason };

    if !record.salary.is_finite() {
        return Err(malformed("salario", format!("'{}' is not a finite number", record.salary)));
    }
    if !record.salary_usd.is_finite() {
        return Err(malformed("usd", format!("'{}' is not a finite number", record.salary_usd)));
    }
    let iso = &record.residence_iso3;
    if iso.len() != 3 || !iso.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(malformed(
            "residencia_iso3",
            format!("'{iso}' is not a three-letter country code"),
        ));
    }
    Ok(record)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Columns beyond the required ones are ignored.
fn load_csv(path: &Path) -> Result<Vec<SalaryRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    check_columns(reader.headers()?.iter())?;

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<SalaryRecord>().enumerate() {
        let row_no = i + 1;
        let record = result.map_err(|e| LoadError::Malformed {
            row: row_no,
            column: "*",
            reason: e.to_string(),
        })?;
        records.push(validate(record, row_no)?);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`).
fn load_json(path: &Path) -> Result<Vec<SalaryRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_reader(reader)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, obj) in rows.into_iter().enumerate() {
        let row_no = i + 1;
        check_columns(obj.keys().map(String::as_str))?;
        let record: SalaryRecord =
            serde_json::from_value(serde_json::Value::Object(obj)).map_err(|e| {
                LoadError::Malformed {
                    row: row_no,
                    column: "*",
                    reason: e.to_string(),
                }
            })?;
        records.push(validate(record, row_no)?);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the salary table.
///
/// Integer columns may be Int32 or Int64, numeric columns Float32/Float64 or
/// integers, text columns Utf8, LargeUtf8 or dictionary-encoded (Pandas
/// `category`, Polars `Categorical`). Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<SalaryRecord>> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    check_columns(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = records.len();
        let cols = BatchColumns::locate(&batch)?;

        for row in 0..batch.num_rows() {
            let row_no = offset + row + 1;
            let year = int_at(&cols.year, row, row_no, "ano")?;
            let record = SalaryRecord {
                year: i32::try_from(year).map_err(|_| LoadError::Malformed {
                    row: row_no,
                    column: "ano",
                    reason: format!("{year} is out of range"),
                })?,
                seniority: string_at(&cols.seniority, row, row_no, "senioridade")?,
                contract: string_at(&cols.contract, row, row_no, "contrato")?,
                company_size: string_at(&cols.company_size, row, row_no, "tamanho_empresa")?,
                job_title: string_at(&cols.job_title, row, row_no, "cargo")?,
                salary: float_at(&cols.salary, row, row_no, "salario")?,
                salary_usd: float_at(&cols.salary_usd, row, row_no, "usd")?,
                remote: string_at(&cols.remote, row, row_no, "remoto")?,
                residence_iso3: string_at(&cols.residence_iso3, row, row_no, "residencia_iso3")?,
            };
            records.push(validate(record, row_no)?);
        }
    }
    Ok(records)
}

// -- Parquet / Arrow helpers --

/// The required columns of one batch. Dictionary-encoded columns are
/// decoded to their value type so the cell helpers only see plain arrays.
struct BatchColumns {
    year: ArrayRef,
    seniority: ArrayRef,
    contract: ArrayRef,
    company_size: ArrayRef,
    job_title: ArrayRef,
    salary: ArrayRef,
    salary_usd: ArrayRef,
    remote: ArrayRef,
    residence_iso3: ArrayRef,
}

impl BatchColumns {
    fn locate(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let col = |name: &str| -> Result<ArrayRef> {
            let idx = schema
                .index_of(name)
                .map_err(|_| LoadError::MissingColumns(vec![name.to_string()]))?;
            let column = batch.column(idx);
            match column.data_type() {
                DataType::Dictionary(_, values) => Ok(cast(column, values)?),
                _ => Ok(Arc::clone(column)),
            }
        };
        Ok(BatchColumns {
            year: col("ano")?,
            seniority: col("senioridade")?,
            contract: col("contrato")?,
            company_size: col("tamanho_empresa")?,
            job_title: col("cargo")?,
            salary: col("salario")?,
            salary_usd: col("usd")?,
            remote: col("remoto")?,
            residence_iso3: col("residencia_iso3")?,
        })
    }
}

fn type_mismatch(col: &ArrayRef, row_no: usize, column: &'static str) -> LoadError {
    LoadError::Malformed {
        row: row_no,
        column,
        reason: format!("unsupported column type {:?}", col.data_type()),
    }
}

fn null_cell(row_no: usize, column: &'static str) -> LoadError {
    LoadError::Malformed {
        row: row_no,
        column,
        reason: "null value".to_string(),
    }
}

/// Extract a string cell from a Utf8 or LargeUtf8 column.
fn string_at(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<String> {
    if col.is_null(row) {
        return Err(null_cell(row_no, column));
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string())
            .ok_or_else(|| type_mismatch(col, row_no, column)),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        _ => Err(type_mismatch(col, row_no, column)),
    }
}

/// Extract an integer cell; floats are accepted when they hold a whole number
/// (Pandas writes integer columns with missing values as float).
fn int_at(col: &ArrayRef, row: usize, row_no: usize, column: &'static str) -> Result<i64> {
    if col.is_null(row) {
        return Err(null_cell(row_no, column));
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as i64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row))
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64),
        _ => None,
    };
    value.ok_or_else(|| type_mismatch(col, row_no, column))
}

/// Extract a numeric cell as `f64`.
fn float_at(col: &ArrayRef, row: usize, row_no: usize, column: &'static str) -> Result<f64> {
    if col.is_null(row) {
        return Err(null_cell(row_no, column));
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        _ => None,
    };
    value.ok_or_else(|| type_mismatch(col, row_no, column))
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write records as CSV using the same headers the loader expects.
/// Returns the number of rows written.
pub fn export_csv<'r>(
    path: &Path,
    records: impl IntoIterator<Item = &'r SalaryRecord>,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut written = 0;
    for rec in records {
        writer.serialize(rec)?;
        written += 1;
    }
    if written == 0 {
        // serde only emits headers together with the first row.
        writer.write_record(REQUIRED_COLUMNS)?;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{DictionaryArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Int32Type, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::tests::record;

    const HEADER: &str =
        "ano,senioridade,contrato,tamanho_empresa,cargo,salario,usd,remoto,residencia_iso3";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{HEADER},moeda\n\
             2024,senior,integral,media,Data Scientist,500000,100000.5,remoto,USA,usd\n\
             2023,junior,freelancer,pequena,Data Analyst,60000,12000,presencial,BRA,brl\n"
        );
        let path = write_file(&dir, "salaries.csv", &contents);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.year, 2024);
        assert_eq!(first.job_title, "Data Scientist");
        assert_eq!(first.salary_usd, 100000.5);
        assert_eq!(first.residence_iso3, "USA");
        assert!(ds.universes().years.contains(&2023));
    }

    #[test]
    fn csv_missing_columns_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "broken.csv",
            "ano,senioridade,contrato,tamanho_empresa,cargo,salario\n2024,a,b,c,d,1\n",
        );

        match load_file(&path) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["usd", "remoto", "residencia_iso3"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn csv_malformed_row_reports_row_number() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{HEADER}\n\
             2024,senior,integral,media,Data Scientist,1,2,remoto,USA\n\
             2024,senior,integral,media,Data Scientist,1,abc,remoto,USA\n"
        );
        let path = write_file(&dir, "bad.csv", &contents);

        match load_file(&path) {
            // Second record after the header.
            Err(LoadError::Malformed { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_country_code_and_non_finite_salary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "iso.csv",
            &format!("{HEADER}\n2024,senior,integral,media,Data Scientist,1,2,remoto,US\n"),
        );
        assert!(matches!(
            load_file(&path),
            Err(LoadError::Malformed { column: "residencia_iso3", .. })
        ));

        let path = write_file(
            &dir,
            "nan.csv",
            &format!("{HEADER}\n2024,senior,integral,media,Data Scientist,1,NaN,remoto,USA\n"),
        );
        assert!(matches!(
            load_file(&path),
            Err(LoadError::Malformed { column: "usd", .. })
        ));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.xlsx", "");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_) | LoadError::Io(_)));
    }

    #[test]
    fn loads_records_oriented_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "salaries.json",
            r#"[
                {"ano": 2022, "senioridade": "pleno", "contrato": "integral",
                 "tamanho_empresa": "grande", "cargo": "ML Engineer", "salario": 90000.0,
                 "usd": 90000.0, "remoto": "hibrido", "residencia_iso3": "DEU", "extra": null}
            ]"#,
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].remote, "hibrido");
    }

    #[test]
    fn json_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "partial.json", r#"[{"ano": 2022}]"#);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::MissingColumns(cols)) if cols.len() == 8
        ));
    }

    #[test]
    fn loads_parquet_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salaries.parquet");

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
                Arc::new(Int64Array::from(vec![2021, 2024])),
                Arc::new(StringArray::from(vec!["junior", "senior"])),
                Arc::new(StringArray::from(vec!["integral", "integral"])),
                Arc::new(StringArray::from(vec!["media", "grande"])),
                Arc::new(StringArray::from(vec!["Data Analyst", "Data Scientist"])),
                Arc::new(Float64Array::from(vec![1000.0, 2000.0])),
                Arc::new(Float64Array::from(vec![200.0, 400.0])),
                Arc::new(StringArray::from(vec!["remoto", "presencial"])),
                Arc::new(StringArray::from(vec!["BRA", "USA"])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].year, 2024);
        assert_eq!(ds.records()[1].salary_usd, 400.0);
        assert_eq!(ds.records()[0].residence_iso3, "BRA");
    }

    #[test]
    fn json_malformed_first_object_is_row_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.json",
            r#"[
                {"ano": "not a year", "senioridade": "pleno", "contrato": "integral",
                 "tamanho_empresa": "grande", "cargo": "ML Engineer", "salario": 1.0,
                 "usd": 1.0, "remoto": "hibrido", "residencia_iso3": "DEU"}
            ]"#,
        );
        assert!(matches!(load_file(&path), Err(LoadError::Malformed { row: 1, .. })));
    }

    #[test]
    fn loads_parquet_with_dictionary_encoded_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categorical.parquet");

        let category = || DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        let schema = Arc::new(Schema::new(vec![
            Field::new("ano", DataType::Int64, false),
            Field::new("senioridade", category(), false),
            Field::new("contrato", category(), false),
            Field::new("tamanho_empresa", category(), false),
            Field::new("cargo", DataType::Utf8, false),
            Field::new("salario", DataType::Float64, false),
            Field::new("usd", DataType::Float64, false),
            Field::new("remoto", category(), false),
            Field::new("residencia_iso3", category(), false),
        ]));
        let dict = |values: Vec<&str>| -> ArrayRef {
            Arc::new(values.into_iter().collect::<DictionaryArray<Int32Type>>())
        };
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2022, 2023, 2023])),
                dict(vec!["senior", "junior", "senior"]),
                dict(vec!["integral", "integral", "contrato"]),
                dict(vec!["media", "media", "grande"]),
                Arc::new(StringArray::from(vec!["Data Scientist", "BI Analyst", "Data Engineer"])),
                Arc::new(Float64Array::from(vec![10.0, 20.0, 30.0])),
                Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])),
                dict(vec!["remoto", "hibrido", "remoto"]),
                dict(vec!["USA", "BRA", "USA"]),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[1].seniority, "junior");
        assert_eq!(ds.records()[2].contract, "contrato");
        assert_eq!(ds.records()[1].residence_iso3, "BRA");
        assert_eq!(
            ds.universes().seniorities.iter().collect::<Vec<_>>(),
            vec!["junior", "senior"]
        );
    }

    #[test]
    fn exported_csv_loads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let records = vec![
            record(2022, "senior", "integral", "media", "Data Scientist", 123.25, "remoto", "USA"),
            record(
                2023, "junior", "freelancer", "pequena", "Data, Analyst", 50.0, "hibrido", "BRA",
            ),
        ];

        let written = export_csv(&path, &records).unwrap();
        assert_eq!(written, 2);
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records(), records.as_slice());
    }

    #[test]
    fn exporting_nothing_still_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(export_csv(&path, std::iter::empty::<&SalaryRecord>()).unwrap(), 0);
        let ds = load_file(&path).unwrap();
        assert!(ds.is_empty());
    }
}
