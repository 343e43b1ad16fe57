//! Incremental Parquet output.
//!
//! [`ParquetFileWriter`] drives `parquet::arrow::ArrowWriter` over an
//! [`AtomicFile`]: batches are appended one at a time and the file only
//! appears at its destination once [`finish`](BatchSink::finish) succeeds.
//! Dropping or [aborting](ParquetFileWriter::abort) an unfinished writer
//! discards the encoder and its temporary file.

use crate::error::ConvertError;
use crate::io::atomic::AtomicFile;
use crate::io::BatchSink;
use anyhow::{Context, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appends record batches to a Parquet file with atomic finalization.
pub struct ParquetFileWriter {
    path: PathBuf,
    schema: SchemaRef,
    writer: Option<ArrowWriter<AtomicFile>>,
    rows: u64,
}

impl ParquetFileWriter {
    /// Start writing `path` with `schema`.
    ///
    /// `row_group_size` caps the number of rows per row group; `None` keeps the
    /// encoder default.
    ///
    /// # Errors
    /// Fails with [`std::io::ErrorKind::NotFound`] if the output directory is
    /// missing, or if the encoder cannot be created.
    pub fn create(
        path: impl AsRef<Path>,
        schema: SchemaRef,
        row_group_size: Option<usize>,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = AtomicFile::create(&path)?;

        let mut props = WriterProperties::builder();
        if let Some(n) = row_group_size {
            props = props.set_max_row_group_row_count(Some(n.max(1)));
        }
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(props.build()))
            .with_context(|| format!("create parquet writer for {}", path.display()))?;

        Ok(Self {
            path,
            schema,
            writer: Some(writer),
            rows: 0,
        })
    }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema the file is written with.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Whether [`finish`](BatchSink::finish) or [`abort`](Self::abort) already ran.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Discard the encoder and the temporary file.
    pub fn abort(mut self) {
        if let Some(writer) = self.writer.take() {
            debug!("aborting parquet output {}", self.path.display());
            drop(writer);
        }
    }
}

impl BatchSink for ParquetFileWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(ConvertError::WriterClosed)?;
        writer
            .write(batch)
            .with_context(|| format!("write batch to {}", self.path.display()))?;
        self.rows += batch.num_rows() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64> {
        let writer = self.writer.take().ok_or(ConvertError::WriterClosed)?;
        let file = writer
            .into_inner()
            .with_context(|| format!("finalize parquet footer for {}", self.path.display()))?;
        file.commit()?;
        debug!("wrote {} row(s) to {}", self.rows, self.path.display());
        Ok(self.rows)
    }

    fn rows_written(&self) -> u64 {
        self.rows
    }
}
