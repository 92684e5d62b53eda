use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray, Date32Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Observation, ObservationTable};
use crate::error::PipelineError;

/// Name of the index column.
pub const DATE_COLUMN: &str = "date";
/// Name of the measurement column.
pub const VALUE_COLUMN: &str = "value";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a page-view series from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with `date` and `value` columns
/// * `.tsv`          – same, tab-delimited
/// * `.json`         – `[{ "date": "2020-01-01", "value": 1234 }, ...]`
/// * `.parquet`      – `date` (date, timestamp or string) and numeric `value`
pub fn load_file(path: &Path) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, b',')?,
        "tsv" => load_delimited(path, b'\t')?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(PipelineError::UnsupportedExtension(other.to_string()).into()),
    };

    match table.date_span() {
        Some((first, last)) => log::info!(
            "Loaded {} observations from {} ({first} .. {last})",
            table.len(),
            path.display()
        ),
        None => log::info!("Loaded an empty series from {}", path.display()),
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a calendar date; datetimes are accepted and truncated to the day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a numeric cell.  An empty cell is a missing value (NaN).
fn parse_value(text: &str, row: usize) -> Result<f64, PipelineError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(f64::NAN);
    }
    text.parse::<f64>().map_err(|_| PipelineError::InvalidValue {
        row,
        text: text.to_string(),
    })
}

fn date_or_err(text: &str, row: usize) -> Result<NaiveDate, PipelineError> {
    parse_date(text).ok_or_else(|| PipelineError::InvalidDate {
        row,
        text: text.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names; `date` and `value` are required, all other
/// columns are ignored.
fn load_delimited(path: &Path, delimiter: u8) -> Result<ObservationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or(PipelineError::MissingColumn(DATE_COLUMN))?;
    let value_idx = headers
        .iter()
        .position(|h| h == VALUE_COLUMN)
        .ok_or(PipelineError::MissingColumn(VALUE_COLUMN))?;

    let mut observations = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let date = date_or_err(record.get(date_idx).unwrap_or(""), row_no)?;
        let value = parse_value(record.get(value_idx).unwrap_or(""), row_no)?;
        observations.push(Observation::new(date, value));
    }

    Ok(ObservationTable::new(observations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One element of the records-oriented JSON layout
/// (`df.to_json(orient='records', date_format='iso')`).
#[derive(Debug, Deserialize)]
struct JsonRecord {
    date: String,
    /// Required key, but `null` is allowed and becomes NaN.
    #[serde(deserialize_with = "Option::deserialize")]
    value: Option<f64>,
}

fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<JsonRecord> = serde_json::from_str(&text).context("parsing JSON")?;

    records
        .into_iter()
        .enumerate()
        .map(|(row, rec)| -> Result<Observation> {
            let date = date_or_err(&rec.date, row)?;
            Ok(Observation::new(date, rec.value.unwrap_or(f64::NAN)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a `date` and a `value` column.
///
/// `date` may be Date32 / Date64 / Timestamp (as written by Pandas and Polars)
/// or a string column; `value` may be any integer or float type.  Nulls in
/// `value` become NaN.
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema();
    let date_idx = schema
        .index_of(DATE_COLUMN)
        .map_err(|_| PipelineError::MissingColumn(DATE_COLUMN))?;
    let value_idx = schema
        .index_of(VALUE_COLUMN)
        .map_err(|_| PipelineError::MissingColumn(VALUE_COLUMN))?;

    let reader = builder.build().context("building parquet reader")?;
    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = observations.len();
        let dates = extract_dates(batch.column(date_idx), offset)?;
        let values = extract_values(batch.column(value_idx))?;

        observations.extend(
            dates
                .into_iter()
                .zip(values)
                .map(|(date, value)| Observation::new(date, value)),
        );
    }

    Ok(ObservationTable::new(observations))
}

// -- Parquet / Arrow helpers --

/// Read the date column; `offset` is the row number of the batch's first row.
fn extract_dates(col: &Arc<dyn Array>, offset: usize) -> Result<Vec<NaiveDate>> {
    match col.data_type() {
        DataType::Utf8 => (0..col.len())
            .map(|i| -> Result<NaiveDate> {
                let text = col.as_string::<i32>();
                Ok(date_or_err(text.value(i), offset + i)?)
            })
            .collect(),
        DataType::LargeUtf8 => (0..col.len())
            .map(|i| -> Result<NaiveDate> {
                let text = col.as_string::<i64>();
                Ok(date_or_err(text.value(i), offset + i)?)
            })
            .collect(),
        _ => {
            let days = cast(col, &DataType::Date32)
                .with_context(|| format!("converting {:?} to dates", col.data_type()))?;
            let days = days
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array")?;
            (0..days.len())
                .map(|i| -> Result<NaiveDate> {
                    days.value_as_date(i)
                        .filter(|_| days.is_valid(i))
                        .ok_or_else(|| {
                            PipelineError::InvalidDate {
                                row: offset + i,
                                text: "<null>".to_string(),
                            }
                            .into()
                        })
                })
                .collect()
        }
    }
}

/// Read the value column as `f64`, mapping nulls to NaN.
fn extract_values(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let floats = cast(col, &DataType::Float64)
        .with_context(|| format!("converting {:?} to floats", col.data_type()))?;
    let floats = floats
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("expected Float64Array")?;
    Ok(floats.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{
        ArrayRef, Int32Array, Int64Array, StringArray, TimestampNanosecondArray,
    };
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_dates_and_datetimes() {
        assert_eq!(parse_date("2016-05-09"), Some(day(2016, 5, 9)));
        assert_eq!(parse_date(" 2016/05/09 "), Some(day(2016, 5, 9)));
        assert_eq!(parse_date("2016-05-09 13:45:00"), Some(day(2016, 5, 9)));
        assert_eq!(parse_date("2016-05-09T00:00:00"), Some(day(2016, 5, 9)));
        assert_eq!(parse_date("09.05.2016"), None);
        assert_eq!(parse_date("2016-02-30"), None);
    }

    #[test]
    fn csv_loads_in_file_order_and_ignores_extra_columns() {
        let file = write_file(
            ".csv",
            "page,date,value\nhome,2016-05-10,1201\nhome,2016-05-09,1201.5\nhome,2016-05-11,\n",
        );
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.observations[0], Observation::new(day(2016, 5, 10), 1201.0));
        assert_eq!(table.observations[1].date, day(2016, 5, 9));
        assert!(table.observations[2].value.is_nan());
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let file = write_file(".tsv", "date\tvalue\n2020-01-01\t5\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.values(), vec![5.0]);
    }

    #[test]
    fn missing_value_column_is_reported() {
        let file = write_file(".csv", "date,views\n2020-01-01,5\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingColumn("value"))
        ));
    }

    #[test]
    fn bad_cells_name_their_row() {
        let file = write_file(".csv", "date,value\n2020-01-01,5\nyesterday,6\n");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "row 1: 'yesterday' is not a valid date");

        let file = write_file(".csv", "date,value\n2020-01-01,lots\n");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "row 0: 'lots' is not a number");
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn unsupported_extension_fails() {
        let file = write_file(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn json_records_allow_null_but_require_the_key() {
        let file = write_file(
            ".json",
            r#"[{"date": "2020-01-01", "value": 3}, {"date": "2020-01-02", "value": null}]"#,
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.observations[0].value, 3.0);
        assert!(table.observations[1].value.is_nan());

        let file = write_file(".json", r#"[{"date": "2020-01-01"}]"#);
        assert!(load_file(file.path()).is_err());
    }

    fn write_parquet(columns: Vec<(&str, ArrayRef)>) -> tempfile::NamedTempFile {
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(out, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_with_date32_and_integer_values() {
        // 18262 days after the epoch is 2020-01-01.
        let file = write_parquet(vec![
            ("date", Arc::new(Date32Array::from(vec![18262, 18263])) as ArrayRef),
            ("value", Arc::new(Int64Array::from(vec![Some(10), None])) as ArrayRef),
        ]);

        let table = load_file(file.path()).unwrap();
        let dates: Vec<_> = table.observations.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![day(2020, 1, 1), day(2020, 1, 2)]);
        assert_eq!(table.observations[0].value, 10.0);
        assert!(table.observations[1].value.is_nan());
    }

    #[test]
    fn parquet_timestamps_truncate_to_the_day() {
        // 2020-01-01 13:30:00 and 2020-01-02 00:00:00
        let file = write_parquet(vec![
            (
                "date",
                Arc::new(TimestampNanosecondArray::from(vec![
                    1_577_885_400_000_000_000,
                    1_577_923_200_000_000_000,
                ])) as ArrayRef,
            ),
            ("value", Arc::new(Float64Array::from(vec![1.5, 2.5])) as ArrayRef),
        ]);

        let table = load_file(file.path()).unwrap();
        assert_eq!(
            table.observations,
            vec![
                Observation::new(day(2020, 1, 1), 1.5),
                Observation::new(day(2020, 1, 2), 2.5),
            ]
        );
    }

    #[test]
    fn parquet_string_dates_are_parsed_and_nulls_rejected() {
        let file = write_parquet(vec![
            (
                "date",
                Arc::new(StringArray::from(vec![Some("2020-01-01"), Some("2020/01/02")]))
                    as ArrayRef,
            ),
            ("value", Arc::new(Int32Array::from(vec![7, 8])) as ArrayRef),
        ]);
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.observations[1], Observation::new(day(2020, 1, 2), 8.0));

        let file = write_parquet(vec![
            (
                "date",
                Arc::new(StringArray::from(vec![Some("2020-01-01"), None])) as ArrayRef,
            ),
            ("value", Arc::new(Int32Array::from(vec![7, 8])) as ArrayRef),
        ]);
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "row 1: '' is not a valid date");
    }

    #[test]
    fn parquet_schema_is_checked_even_without_rows() {
        let file = write_parquet(vec![
            ("day", Arc::new(Date32Array::from(Vec::<i32>::new())) as ArrayRef),
            ("value", Arc::new(Int64Array::from(Vec::<i64>::new())) as ArrayRef),
        ]);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingColumn("date"))
        ));
    }
}
