use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Record, SurveyDataset};
use crate::error::LoadError;

/// Extension of the preferred format: the survey spreadsheet.
pub const PRIMARY_EXTENSION: &str = "xlsx";
/// Extension of the delimited-text fallback.
pub const FALLBACK_EXTENSION: &str = "csv";

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a survey dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header row first (preferred)
/// * `.csv`     – header row followed by one response per row
/// * `.parquet` – Parquet file with one column per survey field
/// * `.json`    – `[{ "Zona": "Norte", "Edad": 41, ... }, ...]`
pub fn load_file(path: &Path) -> Result<SurveyDataset> {
    let ext = extension(path);

    match ext.as_str() {
        e if SPREADSHEET_EXTENSIONS.contains(&e) => load_spreadsheet(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load the survey, preferring the spreadsheet and falling back to CSV.
///
/// Candidates, in order: `path` itself when its extension is supported, then
/// `<stem>.xlsx`, then `<stem>.csv`. The first readable one wins.
pub fn load_with_fallback(path: &Path) -> Result<SurveyDataset, LoadError> {
    let mut attempts = Vec::new();

    for candidate in candidates(path) {
        match load_file(&candidate) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} responses with columns {:?} from {}",
                    dataset.len(),
                    dataset.column_names,
                    candidate.display()
                );
                return Ok(dataset);
            }
            Err(e) => {
                log::warn!("Could not read {}: {e:#}", candidate.display());
                attempts.push((candidate, format!("{e:#}")));
            }
        }
    }

    Err(LoadError::Unreadable { attempts })
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn candidates(path: &Path) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(3);
    let ext = extension(path);
    let supported = SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
        || matches!(ext.as_str(), "parquet" | "pq" | "json" | "csv");
    if supported {
        out.push(path.to_path_buf());
    }
    for ext in [PRIMARY_EXTENSION, FALLBACK_EXTENSION] {
        let candidate = path.with_extension(ext);
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Process-lifetime cache
// ---------------------------------------------------------------------------

/// Loads the survey on first use and hands out the same immutable copy after.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    cell: OnceLock<Arc<SurveyDataset>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Return the cached dataset, loading it on the first call.
    /// A failed load is not cached, so a later call retries.
    pub fn get(&self) -> Result<Arc<SurveyDataset>, LoadError> {
        if let Some(ds) = self.cell.get() {
            return Ok(Arc::clone(ds));
        }
        let loaded = Arc::new(load_with_fallback(&self.path)?);
        Ok(Arc::clone(self.cell.get_or_init(|| loaded)))
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Zona": "Norte", "Consumo_Diario_Lts": 38.5, "Disposición_GNV": "Sí", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SurveyDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let fields = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();

        records.push(Record::new(fields));
    }

    Ok(SurveyDataset::from_records(Vec::new(), records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one response per row.
/// Empty cells are read as nulls; short rows are padded with nulls.
fn load_csv(path: &Path) -> Result<SurveyDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has an empty header row");
    }

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut fields = BTreeMap::new();
        for (col_idx, col_name) in headers.iter().enumerate() {
            let value = row.get(col_idx).map(guess_cell_type).unwrap_or(CellValue::Null);
            fields.insert(col_name.clone(), value);
        }

        records.push(Record::new(fields));
    }

    Ok(SurveyDataset::from_records(headers, records))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    // "NaN" and "inf" parse as floats but are category labels here.
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a workbook. The first row holds the column
/// names; every following row is one response.
fn load_spreadsheet(path: &Path) -> Result<SurveyDataset> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .context("worksheet is empty")?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("spreadsheet has an empty header row");
    }

    let records = rows
        .map(|row| {
            let fields = headers
                .iter()
                .enumerate()
                .map(|(col_idx, name)| {
                    let value = row.get(col_idx).map(sheet_cell).unwrap_or(CellValue::Null);
                    (name.clone(), value)
                })
                .collect();
            Record::new(fields)
        })
        .collect();

    Ok(SurveyDataset::from_records(headers, records))
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Workbooks store every number as a float; whole numbers (ages, years)
/// come back as integers.
fn sheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                CellValue::Null
            } else {
                CellValue::String(s.to_string())
            }
        }
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) if f.is_finite() => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing survey responses.
///
/// Strings, integers, floats and bools are read as such. Other Arrow types
/// (categorical dictionaries, small or unsigned ints, dates) are converted
/// first, see [`normalize_column`]. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<SurveyDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns = batch
            .columns()
            .iter()
            .zip(schema.fields().iter())
            .map(|(col, field)| {
                normalize_column(col).with_context(|| format!("converting column {}", field.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            let fields = schema
                .fields()
                .iter()
                .zip(&columns)
                .map(|(field, col)| (field.name().clone(), extract_cell(col, row)))
                .collect();
            records.push(Record::new(fields));
        }
    }

    Ok(SurveyDataset::from_records(headers, records))
}

// -- Parquet / Arrow helpers --

/// Bring a column to one of the types [`extract_cell`] reads.
///
/// Dictionaries are unpacked to their value type, narrow and unsigned
/// integers widen to `Int64`, `Float16` to `Float64`. Anything else is cast to
/// `Utf8`, or rendered with the Arrow display formatter when no cast exists.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Ok(Arc::clone(col)),
        DataType::Dictionary(_, value_type) => {
            let unpacked = cast(col, value_type)?;
            return normalize_column(&unpacked);
        }
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 => DataType::Float64,
        _ => DataType::Utf8,
    };

    match cast(col, &target) {
        Ok(converted) => Ok(converted),
        Err(e) if target == DataType::Utf8 => {
            log::debug!("no Utf8 cast for {}, formatting instead: {e}", col.data_type());
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)?;
            let text: StringArray = (0..col.len())
                .map(|row| (!col.is_null(row)).then(|| formatter.value(row).to_string()))
                .collect();
            Ok(Arc::new(text))
        }
        Err(e) => Err(e.into()),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::String(s.value(row).to_string()))
            .unwrap_or(CellValue::Null),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64))
            .unwrap_or(CellValue::Null),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64))
            .unwrap_or(CellValue::Null),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row)))
            .unwrap_or(CellValue::Null),
        // normalize_column leaves no other types
        _ => CellValue::Null,
    }
}
