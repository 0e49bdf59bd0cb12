use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{Answers, QuestionnaireDataset, Response, N_QUESTIONS, QUESTION_COLUMNS};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a questionnaire table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "age": 31, "gender": "F", "email": "...", "q1": 80, ... }, ...]`
/// * `.csv`     – header row with the same column names, empty cells are null
/// * `.parquet` – columns with the same names, nullable numeric / utf8 types
///
/// Any failure is reported as [`AnalysisError::MalformedInput`] carrying the
/// full context chain.
pub fn load_file(path: &Path) -> Result<QuestionnaireDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    };

    match loaded {
        Ok(dataset) => {
            log::info!("Loaded {} responses from {}", dataset.len(), path.display());
            if dataset.is_empty() {
                log::warn!("{} contains no responses", path.display());
            }
            Ok(dataset)
        }
        Err(e) => Err(AnalysisError::MalformedInput {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        }),
    }
}

/// Fields shared by every source format, before validation.
struct RawRow {
    age: Option<f64>,
    gender: Option<String>,
    email: Option<String>,
    answers: Answers,
}

fn build_response(row: usize, raw: RawRow) -> anyhow::Result<Response> {
    let Some(gender) = raw.gender else {
        bail!("Row {row}: missing or null 'gender'");
    };
    if let Some(age) = raw.age {
        if !age.is_finite() || age < 0.0 {
            bail!("Row {row}: 'age' must be a non-negative number, got {age}");
        }
    }
    for (col, answer) in QUESTION_COLUMNS.iter().zip(raw.answers.iter()) {
        if let Some(v) = answer {
            if !v.is_finite() {
                bail!("Row {row}: '{col}' is not a finite number");
            }
        }
    }
    Ok(Response {
        age: raw.age,
        gender,
        email: raw.email,
        answers: raw.answers,
        score: None,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 45, "gender": "F", "email": "ann@example.com",
///     "q1": 80, "q2": null, "q3": 75.5, "q4": 90, "q5": 60 },
///   ...
/// ]
/// ```
///
/// Absent numeric keys read as null. A `score` key (as written by the
/// exporter) restores the score column.
fn load_json(path: &Path) -> anyhow::Result<QuestionnaireDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    let mut has_scores = false;

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut answers = [None; N_QUESTIONS];
        for (slot, col) in answers.iter_mut().zip(QUESTION_COLUMNS) {
            *slot = json_optional_f64(obj.get(col), i, col)?;
        }

        let raw = RawRow {
            age: json_optional_f64(obj.get("age"), i, "age")?,
            gender: json_optional_string(obj.get("gender"), i, "gender")?,
            email: json_optional_string(obj.get("email"), i, "email")?,
            answers,
        };
        let mut response = build_response(i, raw)?;

        if obj.contains_key("score") {
            has_scores = true;
            response.score = json_score(obj, i)?;
        }

        rows.push(response);
    }

    let mut dataset = QuestionnaireDataset::from_rows(rows);
    dataset.has_scores = has_scores;
    Ok(dataset)
}

fn json_optional_f64(val: Option<&JsonValue>, row: usize, col: &str) -> anyhow::Result<Option<f64>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .with_context(|| format!("Row {row}: '{col}' is not a number")),
    }
}

fn json_optional_string(
    val: Option<&JsonValue>,
    row: usize,
    col: &str,
) -> anyhow::Result<Option<String>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => bail!("Row {row}: '{col}' must be a string, got {other}"),
    }
}

fn json_score(obj: &Map<String, JsonValue>, row: usize) -> anyhow::Result<Option<u8>> {
    match obj.get("score") {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => {
            let n = v
                .as_u64()
                .with_context(|| format!("Row {row}: 'score' is not an unsigned integer"))?;
            let score = u8::try_from(n)
                .with_context(|| format!("Row {row}: 'score' {n} is outside 0..=255"))?;
            Ok(Some(score))
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names `age,gender,email,q1..q5`.
/// Empty cells are null. Numeric columns that are absent read as null.
/// `gender` and `email` are taken as written, surrounding spaces included.
fn load_csv(path: &Path) -> anyhow::Result<QuestionnaireDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);

    let gender_idx = position("gender").context("CSV missing 'gender' column")?;
    let email_idx = position("email");
    let age_idx = position("age");
    let q_idx: Vec<Option<usize>> = QUESTION_COLUMNS.iter().map(|c| position(*c)).collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        // Text cells are kept verbatim; only numbers tolerate padding.
        let text = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
        };
        let number = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let mut answers = [None; N_QUESTIONS];
        for (j, slot) in answers.iter_mut().enumerate() {
            *slot = parse_csv_f64(number(q_idx[j]), row_no, QUESTION_COLUMNS[j])?;
        }

        let raw = RawRow {
            age: parse_csv_f64(number(age_idx), row_no, "age")?,
            gender: text(Some(gender_idx)).map(str::to_string),
            email: text(email_idx).map(str::to_string),
            answers,
        };
        rows.push(build_response(row_no, raw)?);
    }

    Ok(QuestionnaireDataset::from_rows(rows))
}

fn parse_csv_f64(cell: Option<&str>, row: usize, col: &str) -> anyhow::Result<Option<f64>> {
    match cell {
        None => Ok(None),
        Some(tok) if tok.eq_ignore_ascii_case("nan") || tok.eq_ignore_ascii_case("null") => {
            Ok(None)
        }
        Some(tok) => tok
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number")),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the questionnaire table.
///
/// Expected schema:
/// - `age`, `q1`..`q5`: Int32 / Int64 / Float32 / Float64, nullable
/// - `gender`: Utf8 or LargeUtf8
/// - `email`: Utf8 or LargeUtf8, nullable, may be absent
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> anyhow::Result<QuestionnaireDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let n_rows = batch.num_rows();

        let column = |name: &str| schema.index_of(name).ok().map(|i| batch.column(i));

        let gender_col = column("gender").context("Parquet file missing 'gender' column")?;
        let email_col = column("email");
        let age_col = column("age");
        let q_cols: Vec<Option<&Arc<dyn Array>>> =
            QUESTION_COLUMNS.iter().map(|c| column(*c)).collect();

        for i in 0..n_rows {
            let row = rows.len();

            let mut answers = [None; N_QUESTIONS];
            for (j, slot) in answers.iter_mut().enumerate() {
                if let Some(col) = q_cols[j] {
                    *slot = extract_optional_f64(col, i)
                        .with_context(|| format!("Row {row}: failed to read '{}'", QUESTION_COLUMNS[j]))?;
                }
            }

            let age = match age_col {
                Some(col) => extract_optional_f64(col, i)
                    .with_context(|| format!("Row {row}: failed to read 'age'"))?,
                None => None,
            };
            let email = match email_col {
                Some(col) => extract_optional_string(col, i)
                    .with_context(|| format!("Row {row}: failed to read 'email'"))?,
                None => None,
            };
            let gender = extract_optional_string(gender_col, i)
                .with_context(|| format!("Row {row}: failed to read 'gender'"))?;

            rows.push(build_response(
                row,
                RawRow {
                    age,
                    gender,
                    email,
                    answers,
                },
            )?);
        }
    }

    Ok(QuestionnaireDataset::from_rows(rows))
}

// -- Parquet / Arrow helpers --

/// Extract a nullable number from a numeric column at the given row.
fn extract_optional_f64(col: &Arc<dyn Array>, row: usize) -> anyhow::Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.value(row) as f64
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.value(row) as f64
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            arr.value(row) as f64
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            arr.value(row)
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    // Pandas writes missing floats as NaN rather than null.
    Ok((!value.is_nan()).then_some(value))
}

/// Extract a nullable string from a Utf8 / LargeUtf8 column at the given row.
fn extract_optional_string(col: &Arc<dyn Array>, row: usize) -> anyhow::Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(Some(arr.value(row).to_string()))
        }
        DataType::LargeUtf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .context("expected LargeStringArray")?;
            Ok(Some(arr.value(row).to_string()))
        }
        other => bail!("Expected a string column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;

    fn temp_with(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn json_records_with_nulls() {
        let file = temp_with(
            ".json",
            r#"[
                {"age": 45, "gender": "F", "email": "ann@example.com",
                 "q1": 80, "q2": null, "q3": 75.5, "q4": 90, "q5": 60},
                {"age": null, "gender": "M", "email": "bob@example.com",
                 "q1": 10, "q2": 20, "q3": 30, "q4": 40}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert!(!ds.has_scores);
        assert_eq!(ds.rows[0].age, Some(45.0));
        assert_eq!(ds.rows[0].gender, "F");
        assert_eq!(ds.rows[0].email.as_deref(), Some("ann@example.com"));
        assert_eq!(
            ds.rows[0].answers,
            [Some(80.0), None, Some(75.5), Some(90.0), Some(60.0)]
        );
        assert_eq!(ds.rows[1].age, None);
        // q5 absent reads as null
        assert_eq!(ds.rows[1].answers[4], None);
    }

    #[test]
    fn json_null_email_is_kept_as_none() {
        let file = temp_with(
            ".json",
            r#"[{"age": 20, "gender": "F", "email": null, "q1": 1, "q2": 1, "q3": 1, "q4": 1, "q5": 1},
                {"age": 20, "gender": "F", "q1": 1, "q2": 1, "q3": 1, "q4": 1, "q5": 1}]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.rows[0].email, None);
        assert_eq!(ds.rows[1].email, None);
    }

    #[test]
    fn json_score_key_restores_score_column() {
        let file = temp_with(
            ".json",
            r#"[{"age": 20, "gender": "F", "email": "a@b.com", "q1": 1, "q2": 1, "q3": 1, "q4": 1, "q5": 1, "score": 1},
                {"age": 20, "gender": "F", "email": "a@b.com", "q1": null, "q2": null, "q3": 1, "q4": 1, "q5": 1, "score": null}]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.scores(), Some(vec![Some(1), None]));
    }

    #[test]
    fn malformed_json_inputs_are_rejected() {
        let cases = [
            "not json",
            r#"{"age": 1}"#,
            r#"[1, 2]"#,
            r#"[{"age": "old", "gender": "F", "email": "a@b.com"}]"#,
            r#"[{"age": 30, "email": "a@b.com"}]"#,
            r#"[{"age": 30, "gender": "F", "email": 42}]"#,
            r#"[{"age": -3, "gender": "F", "email": "a@b.com"}]"#,
            r#"[{"age": 30, "gender": "F", "email": "a@b.com", "q1": "ten"}]"#,
        ];
        for contents in cases {
            let file = temp_with(".json", contents);
            let err = load_file(file.path()).unwrap_err();
            assert!(
                matches!(err, AnalysisError::MalformedInput { .. }),
                "{contents}: {err}"
            );
        }
    }

    #[test]
    fn unsupported_extension_is_malformed() {
        let file = temp_with(".txt", "[]");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn csv_empty_cells_are_null() {
        let file = temp_with(
            ".csv",
            "age,gender,email,q1,q2,q3,q4,q5\n\
             45,F,ann@example.com,80,,75,90,60\n\
             ,M,,1,2,3,4,NaN\n",
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].answers[1], None);
        assert_eq!(ds.rows[0].answers[2], Some(75.0));
        assert_eq!(ds.rows[1].age, None);
        assert_eq!(ds.rows[1].email, None);
        assert_eq!(ds.rows[1].answers[4], None);
    }

    #[test]
    fn csv_text_cells_are_not_trimmed() {
        let file = temp_with(
            ".csv",
            "age,gender,email,q1,q2,q3,q4,q5\n\
             30,F, .a@b.com, 1 ,2,3,4,5\n",
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.rows[0].email.as_deref(), Some(" .a@b.com"));
        assert_eq!(ds.rows[0].answers[0], Some(1.0));
        // the raw address passes, so the row survives the email filter
        let cleaned = crate::data::filter::remove_rows_without_mail(&ds).unwrap();
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn csv_without_gender_is_malformed() {
        let file = temp_with(".csv", "age,email\n30,a@b.com\n");
        assert!(matches!(
            load_file(file.path()),
            Err(AnalysisError::MalformedInput { .. })
        ));
    }

    #[test]
    fn parquet_mixed_numeric_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, true),
            Field::new("gender", DataType::Utf8, false),
            Field::new("email", DataType::Utf8, true),
            Field::new("q1", DataType::Float64, true),
            Field::new("q2", DataType::Float64, true),
            Field::new("q3", DataType::Int32, true),
            Field::new("q4", DataType::Float32, true),
            Field::new("q5", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(45), None])),
                Arc::new(StringArray::from(vec!["F", "M"])),
                Arc::new(StringArray::from(vec![Some("ann@example.com"), None])),
                Arc::new(Float64Array::from(vec![Some(80.0), Some(f64::NAN)])),
                Arc::new(Float64Array::from(vec![None, Some(20.0)])),
                Arc::new(Int32Array::from(vec![Some(75), Some(30)])),
                Arc::new(Float32Array::from(vec![Some(90.0), Some(40.0)])),
                Arc::new(Float64Array::from(vec![Some(60.0), Some(50.0)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].age, Some(45.0));
        assert_eq!(
            ds.rows[0].answers,
            [Some(80.0), None, Some(75.0), Some(90.0), Some(60.0)]
        );
        assert_eq!(ds.rows[1].age, None);
        assert_eq!(ds.rows[1].email, None);
        assert_eq!(ds.rows[1].answers[0], None);
    }
}
