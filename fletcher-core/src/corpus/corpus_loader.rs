//! Reading the corpus and the topic matrix from flat files
//!
//! Both files go through the arrow CSV/JSON readers with schema inference, so
//! integer and floating columns are accepted interchangeably and cast to the
//! types the selection context works with.

use super::document::{Corpus, Document};
use super::topic_matrix::TopicMatrix;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::csv::reader::Format;
use arrow::datatypes::DataType;
use arrow::json::reader::infer_json_schema;
use arrow::record_batch::RecordBatch;

use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

/// Layouts the corpus file can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    /// Comma separated with a header row
    Csv,
    /// Newline delimited JSON objects
    Json,
}

impl CorpusFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json" | "jsonl" | "ndjson") => Ok(Self::Json),
            _ => Err(anyhow!(
                "Cannot tell the corpus format of {path:?}, expected a .csv or .json file."
            )),
        }
    }
}

#[instrument(level = "trace", skip(reader))]
fn read_csv_batches<R: Read + Seek>(
    mut reader: R,
    header: bool,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let format = Format::default().with_header(header).with_delimiter(b',');
    let (schema, _) = format.infer_schema(&mut reader, None)?;
    reader.rewind()?;
    let csv = arrow::csv::ReaderBuilder::new(Arc::new(schema))
        .with_batch_size(batch_size)
        .with_format(format)
        .build(reader)?;
    Ok(csv.collect::<Result<Vec<_>, _>>()?)
}

#[instrument(level = "trace", skip(bytes))]
fn read_json_batches(bytes: &[u8], batch_size: usize) -> Result<Vec<RecordBatch>> {
    let mut cursor = Cursor::new(bytes);
    let (schema, _) = infer_json_schema(&mut cursor, None)?;
    cursor.rewind()?;
    let reader = arrow::json::ReaderBuilder::new(Arc::new(schema))
        .with_batch_size(batch_size)
        .build(cursor)?;
    Ok(reader.collect::<Result<Vec<_>, _>>()?)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("Corpus is missing the `{name}` column."))
}

fn string_values(array: &ArrayRef) -> Result<Vec<String>> {
    let array = cast(array, &DataType::Utf8)?;
    let strings = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow!("Expected a string column."))?;
    Ok(strings
        .iter()
        .map(|s| s.unwrap_or_default().to_string())
        .collect())
}

fn timestamp_values(array: &ArrayRef) -> Result<Vec<i64>> {
    let array = cast(array, &DataType::Int64)?;
    if array.null_count() > 0 {
        return Err(anyhow!(
            "Column `timestamp` has {} missing or non-numeric values.",
            array.null_count()
        ));
    }
    let timestamps = array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| anyhow!("Expected an integer timestamp column."))?;
    Ok(timestamps.values().to_vec())
}

/// Missing `keep` column means every row is kept; null cells are not kept
fn keep_values(batch: &RecordBatch) -> Result<Vec<bool>> {
    let Some(array) = batch.column_by_name("keep") else {
        return Ok(vec![true; batch.num_rows()]);
    };
    let array = cast(array, &DataType::Boolean)?;
    let keep = array
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| anyhow!("Expected a boolean keep column."))?;
    Ok(keep.iter().map(|k| k.unwrap_or(false)).collect())
}

/// Build the corpus from record batches, dropping rows whose `keep` flag is unset
pub fn corpus_from_batches(batches: &[RecordBatch]) -> Result<Corpus> {
    let mut documents = Vec::new();
    let mut row = 0;
    let mut dropped = 0;
    for batch in batches {
        let titles = string_values(column(batch, "title")?)?;
        let texts = string_values(column(batch, "text")?)?;
        let timestamps = timestamp_values(column(batch, "timestamp")?)?;
        let keep = keep_values(batch)?;

        let rows = titles.into_iter().zip(texts).zip(timestamps).zip(keep);
        for (((title, text), timestamp), keep) in rows {
            if keep {
                documents.push(Document {
                    id: row,
                    title,
                    text,
                    timestamp,
                });
            } else {
                dropped += 1;
            }
            row += 1;
        }
    }
    debug!(kept = documents.len(), dropped, "Filtered corpus rows on the keep flag");
    Ok(Corpus::new(documents))
}

/// Corpus from CSV bytes with a header row
pub fn corpus_from_csv(bytes: &[u8], batch_size: usize) -> Result<Corpus> {
    let batches = read_csv_batches(Cursor::new(bytes), true, batch_size)?;
    corpus_from_batches(&batches)
}

/// Corpus from newline delimited JSON bytes
pub fn corpus_from_json(bytes: &[u8], batch_size: usize) -> Result<Corpus> {
    let batches = read_json_batches(bytes, batch_size)?;
    corpus_from_batches(&batches)
}

#[instrument(level = "trace")]
pub fn load_corpus(path: &Path, batch_size: usize) -> Result<Corpus> {
    let format = CorpusFormat::from_path(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read corpus file {path:?}"))?;
    let corpus = match format {
        CorpusFormat::Csv => corpus_from_csv(&bytes, batch_size),
        CorpusFormat::Json => corpus_from_json(&bytes, batch_size),
    }
    .with_context(|| format!("Failed to parse corpus file {path:?}"))?;
    info!(documents = corpus.len(), ?path, "Loaded corpus");
    Ok(corpus)
}

/// Build the topic matrix from record batches, one column per topic
pub fn topic_matrix_from_batches(batches: &[RecordBatch]) -> Result<TopicMatrix> {
    let n_columns = batches.first().map(|b| b.num_columns()).unwrap_or_default();
    let mut weights = Vec::with_capacity(
        n_columns * batches.iter().map(|b| b.num_rows()).sum::<usize>(),
    );
    for batch in batches {
        let columns = batch
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let column = cast(column, &DataType::Float64)?;
                if column.null_count() > 0 {
                    return Err(anyhow!(
                        "Topic matrix column {i} has {} missing or non-numeric values.",
                        column.null_count()
                    ));
                }
                Ok(column)
            })
            .collect::<Result<Vec<ArrayRef>>>()?;
        let columns = columns
            .iter()
            .map(|c| {
                c.as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| anyhow!("Expected a floating point column."))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            weights.extend(columns.iter().map(|c| c.value(row)));
        }
    }
    TopicMatrix::from_row_major(n_columns, weights)
}

/// Topic matrix from CSV bytes, optionally with a header row
pub fn topic_matrix_from_csv(bytes: &[u8], header: bool, batch_size: usize) -> Result<TopicMatrix> {
    let batches = read_csv_batches(Cursor::new(bytes), header, batch_size)?;
    topic_matrix_from_batches(&batches)
}

#[instrument(level = "trace")]
pub fn load_topic_matrix(path: &Path, header: bool, batch_size: usize) -> Result<TopicMatrix> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read topic matrix file {path:?}"))?;
    let matrix = topic_matrix_from_csv(&bytes, header, batch_size)
        .with_context(|| format!("Failed to parse topic matrix file {path:?}"))?;
    info!(
        rows = matrix.n_rows(),
        columns = matrix.n_columns(),
        ?path,
        "Loaded topic matrix"
    );
    Ok(matrix)
}
