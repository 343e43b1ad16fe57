//! Streaming CSV decoding into Arrow record batches.
//!
//! This module provides:
//! - [`DecodeOptions`] - I/O buffer size, rows per batch and the inference window
//! - [`CsvDecoder`] - opens a path or any [`Read`] as a lazy batch stream
//! - [`CsvBatches`] - the stream itself; an iterator of `Result<RecordBatch>`
//!
//! # Design notes
//! - The header row always supplies the column names.
//! - Types are inferred from the first `infer_rows` data rows. The bytes read
//!   during inference are recorded and replayed into the decoder, so streams
//!   that cannot seek (archive members) work and no row is lost.
//! - With a target schema, columns whose names appear in the target are decoded
//!   directly as the target's type. A value that does not parse is a decode
//!   error. Columns the target does not know keep their inferred type, which
//!   lets [`validate_batch_schema`](crate::schema::validate_batch_schema) spot
//!   the structural difference afterwards.
//! - `Null` is never used as a read type. A column inferred as `Null` (every
//!   sampled value empty) is read as `Utf8`, so later values are kept. A column
//!   the target declares `Null` is read as `Utf8` too and must stay empty; any
//!   value in it is a decode error.
//! - `chunk_bytes` only sizes the read buffer. It never changes row content.
//! - Zero-row batches are dropped.

use crate::error::ConvertError;
use anyhow::{Context, Result};
use arrow::csv::reader::{BufReader as CsvBufReader, Format};
use arrow::csv::ReaderBuilder;
use arrow::array::{new_null_array, Array, ArrayRef};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// Smallest read buffer handed to the decoder.
pub const MIN_CHUNK_BYTES: usize = 4 * 1024;
/// Largest read buffer handed to the decoder.
pub const MAX_CHUNK_BYTES: usize = 256 * 1024 * 1024;
/// Default read buffer (1 MiB).
pub const DEFAULT_CHUNK_BYTES: usize = 1024 * 1024;
/// Default upper bound of rows per decoded batch.
pub const DEFAULT_BATCH_ROWS: usize = 8 * 1024;
/// Default number of data rows used for type inference.
pub const DEFAULT_INFER_ROWS: usize = 1000;

/// Tuning knobs for [`CsvDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Read buffer capacity in bytes, clamped to
    /// [`MIN_CHUNK_BYTES`]..=[`MAX_CHUNK_BYTES`].
    pub chunk_bytes: usize,
    /// Maximum rows per batch.
    pub batch_rows: usize,
    /// Data rows sampled for type inference.
    pub infer_rows: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            batch_rows: DEFAULT_BATCH_ROWS,
            infer_rows: DEFAULT_INFER_ROWS,
        }
    }
}

impl DecodeOptions {
    #[must_use]
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    #[must_use]
    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows;
        self
    }

    #[must_use]
    pub fn with_infer_rows(mut self, infer_rows: usize) -> Self {
        self.infer_rows = infer_rows;
        self
    }
}

/// Opens CSV sources as [`CsvBatches`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder {
    options: DecodeOptions,
}

impl CsvDecoder {
    #[must_use]
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Open a CSV file on disk.
    ///
    /// # Errors
    /// Returns [`ConvertError::InputNotFound`] for a missing file, or any error
    /// from [`open`](Self::open).
    pub fn open_path(
        &self,
        path: impl AsRef<Path>,
        target: Option<SchemaRef>,
    ) -> Result<CsvBatches<File>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConvertError::InputNotFound(path.to_path_buf()).into());
        }
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        self.open(f, target, path.display().to_string())
    }

    /// Open any byte stream. `origin` names the source in error messages.
    ///
    /// Reads the header and up to `infer_rows` data rows immediately; batches
    /// are decoded lazily as the result is iterated.
    ///
    /// # Errors
    /// Returns [`ConvertError::Decode`] if the header/sample cannot be parsed.
    pub fn open<R: Read>(
        &self,
        source: R,
        target: Option<SchemaRef>,
        origin: impl Into<String>,
    ) -> Result<CsvBatches<R>> {
        let origin = origin.into();
        let mut recorder = Recorder {
            inner: source,
            seen: Vec::new(),
        };
        let (inferred, _) = Format::default()
            .with_header(true)
            .infer_schema(&mut recorder, Some(self.options.infer_rows.max(1)))
            .map_err(|source| ConvertError::Decode {
                origin: origin.clone(),
                source,
            })?;
        let Recorder { inner, seen } = recorder;

        let inferred = widen_null_columns(&inferred);
        let schema = Arc::new(match target {
            Some(target) => apply_target_types(&inferred, &target),
            None => inferred,
        });

        if schema.fields().is_empty() {
            return Ok(CsvBatches {
                schema,
                reader: None,
                empty_columns: Vec::new(),
                origin,
            });
        }

        let empty_columns: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.data_type() == &DataType::Null)
            .map(|(i, _)| i)
            .collect();
        let read_schema = Arc::new(widen_null_columns(&schema));

        let replay = Cursor::new(seen).chain(inner);
        let capacity = self
            .options
            .chunk_bytes
            .clamp(MIN_CHUNK_BYTES, MAX_CHUNK_BYTES);
        let buffered = BufReader::with_capacity(capacity, replay);
        let reader = ReaderBuilder::new(read_schema)
            .with_header(true)
            .with_batch_size(self.options.batch_rows.max(1))
            .build_buffered(buffered)
            .map_err(|source| ConvertError::Decode {
                origin: origin.clone(),
                source,
            })?;

        Ok(CsvBatches {
            schema,
            reader: Some(reader),
            empty_columns,
            origin,
        })
    }
}

/// Lazy, finite sequence of non-empty record batches.
pub struct CsvBatches<R: Read> {
    schema: SchemaRef,
    reader: Option<CsvBufReader<BufReader<std::io::Chain<Cursor<Vec<u8>>, R>>>>,
    /// Columns the target declares `Null`; read as `Utf8` and checked empty.
    empty_columns: Vec<usize>,
    origin: String,
}

impl<R: Read> CsvBatches<R> {
    /// Schema every batch of this stream carries.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}

impl<R: Read> Iterator for CsvBatches<R> {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        loop {
            let decoded = reader
                .next()?
                .and_then(|batch| restore_empty_columns(batch, &self.schema, &self.empty_columns));
            match decoded {
                Ok(batch) if batch.num_rows() == 0 => continue,
                Ok(batch) => return Some(Ok(batch)),
                Err(source) => {
                    // a decode error ends the stream
                    self.reader = None;
                    return Some(Err(ConvertError::Decode {
                        origin: self.origin.clone(),
                        source,
                    }
                    .into()));
                }
            }
        }
    }
}

/// Read type for every `Null` column is `Utf8`.
fn widen_null_columns(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| match f.data_type() {
            DataType::Null => Field::new(f.name(), DataType::Utf8, true),
            _ => f.as_ref().clone(),
        })
        .collect();
    Schema::new(fields)
}

/// Turn the `Utf8` stand-ins for target `Null` columns back into `Null`,
/// failing if any of them holds a value.
fn restore_empty_columns(
    batch: RecordBatch,
    schema: &SchemaRef,
    empty_columns: &[usize],
) -> Result<RecordBatch, ArrowError> {
    if empty_columns.is_empty() {
        return Ok(batch);
    }
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    for &i in empty_columns {
        let len = columns[i].len();
        if columns[i].null_count() != len {
            return Err(ArrowError::CastError(format!(
                "column '{}' is typed null but holds a value",
                schema.field(i).name()
            )));
        }
        columns[i] = new_null_array(&DataType::Null, len);
    }
    RecordBatch::try_new(schema.clone(), columns)
}

/// Replace the inferred type of every column the target knows by name.
///
/// Duplicate names in the target resolve to their first occurrence.
fn apply_target_types(inferred: &Schema, target: &Schema) -> Schema {
    let mut by_name: HashMap<&str, &Field> = HashMap::new();
    for f in target.fields() {
        by_name.entry(f.name().as_str()).or_insert(f.as_ref());
    }
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| match by_name.get(f.name().as_str()) {
            Some(t) => Field::new(f.name(), t.data_type().clone(), true),
            None => f.as_ref().clone(),
        })
        .collect();
    Schema::new(fields)
}

/// Records every byte read through it so it can be replayed.
struct Recorder<R> {
    inner: R,
    seen: Vec<u8>,
}

impl<R: Read> Read for Recorder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.seen.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}
