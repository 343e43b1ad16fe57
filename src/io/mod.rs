//! I/O building blocks: decoding, encoding, archives and atomic output.
//!
//! The conversion pump ([`copy_batches`]) only knows two things: an iterator
//! of `Result<RecordBatch>` on the decode side and a [`BatchSink`] on the
//! encode side. Concrete formats live in the submodules.

pub mod archive;
pub mod atomic;
pub mod compression;
pub mod csv;
pub mod extract;
pub mod parquet;

use crate::schema::validate_batch_schema;
use anyhow::Result;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

/// Encoder capability: accepts batches, then finalizes once.
pub trait BatchSink {
    /// Append one batch.
    ///
    /// # Errors
    /// Fails if the sink is already finished or the encoder rejects the batch.
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;

    /// Flush and publish the output. Returns the total rows written.
    ///
    /// # Errors
    /// Fails if called twice or if finalization fails.
    fn finish(&mut self) -> Result<u64>;

    /// Rows accepted so far.
    fn rows_written(&self) -> u64;
}

/// Move every batch from `batches` into `sink`, one at a time.
///
/// When `expected` is given, each batch is validated before it is written.
/// Each batch is dropped right after it is written, so at most one is alive.
/// The sink is not finished here; a failure leaves it unfinished for the caller
/// to drop.
///
/// # Errors
/// The first decode, validation or write error.
pub fn copy_batches<I, S>(batches: I, sink: &mut S, expected: Option<&Schema>) -> Result<u64>
where
    I: IntoIterator<Item = Result<RecordBatch>>,
    S: BatchSink + ?Sized,
{
    let mut rows = 0u64;
    for batch in batches {
        let batch = batch?;
        if let Some(expected) = expected {
            validate_batch_schema(&batch, expected)?;
        }
        sink.write_batch(&batch)?;
        rows += batch.num_rows() as u64;
    }
    Ok(rows)
}
