//! Output inspection helpers.

use crate::io::atomic::TEMP_SUFFIX;
use anyhow::{Context, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read every batch of a Parquet file.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn read_parquet_batches(path: impl AsRef<Path>) -> Result<Vec<RecordBatch>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("open ParquetRecordBatchReader")?
        .build()
        .context("build ParquetRecordBatchReader")?;
    reader
        .map(|b| b.context("read next batch"))
        .collect()
}

/// Total rows stored in a Parquet file.
///
/// # Errors
/// See [`read_parquet_batches`].
pub fn parquet_row_count(path: impl AsRef<Path>) -> Result<usize> {
    Ok(read_parquet_batches(path)?.iter().map(RecordBatch::num_rows).sum())
}

/// Arrow schema stored in a Parquet file.
///
/// # Errors
/// Returns an error if the file cannot be opened or its metadata read.
pub fn read_parquet_schema(path: impl AsRef<Path>) -> Result<SchemaRef> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("open ParquetRecordBatchReader")?;
    Ok(builder.schema().clone())
}

/// In-flight temporary files left in `dir`.
#[must_use]
pub fn temp_files_in(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir.as_ref()) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.to_string_lossy().ends_with(TEMP_SUFFIX))
        .collect()
}

/// Assert that no temporary files remain in `dir`.
///
/// # Panics
/// Panics listing the leftover files.
pub fn assert_no_temp_files(dir: impl AsRef<Path>) {
    let leftover = temp_files_in(&dir);
    assert!(
        leftover.is_empty(),
        "temporary files left in {}: {leftover:?}",
        dir.as_ref().display()
    );
}
