//! Schema inference from archive members and structural schema validation.

use crate::error::{MismatchKind, SchemaMismatch};
use crate::io::archive::TarArchive;
use crate::io::csv::{CsvDecoder, DecodeOptions};
use anyhow::{Context, Result};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use tracing::debug;

/// Infer the canonical schema from one archive member.
///
/// Decodes batches until at least `sample_rows` rows were seen or the member
/// ends, then returns the schema of the first non-empty batch. A member with
/// no data rows falls back to the schema of the whole-member decode (header
/// names with the decoder's types for empty columns), so a valid header-only
/// file never fails inference.
///
/// # Errors
/// Fails if the member cannot be opened or decoded.
pub fn infer_schema(
    archive: &TarArchive,
    member: &str,
    sample_rows: usize,
    options: DecodeOptions,
) -> Result<SchemaRef> {
    let sample_rows = sample_rows.max(1);
    // batches never reach past the rows the types were inferred from
    let decoder = CsvDecoder::new(
        options
            .with_infer_rows(sample_rows)
            .with_batch_rows(sample_rows.min(options.batch_rows.max(1))),
    );
    archive
        .with_member(member, |stream| {
            let mut batches = decoder.open(stream, None, member)?;
            let mut first: Option<SchemaRef> = None;
            let mut seen = 0usize;
            for batch in batches.by_ref() {
                let batch = batch?;
                seen += batch.num_rows();
                first.get_or_insert_with(|| batch.schema());
                if seen >= sample_rows {
                    break;
                }
            }
            let schema = first.unwrap_or_else(|| batches.schema());
            debug!("inferred schema from {member} ({seen} row(s) sampled): {schema:?}");
            Ok(schema)
        })
        .with_context(|| format!("infer schema from {member}"))
}

/// Check that `batch` has exactly the `expected` structure.
///
/// Column count is compared first, then every name pairwise, then every type
/// pairwise; the first failing check is reported. Nullability is ignored.
///
/// # Errors
/// A [`SchemaMismatch`] describing the first difference.
pub fn validate_batch_schema(batch: &RecordBatch, expected: &Schema) -> Result<()> {
    check_schema(batch.schema_ref(), expected).map_err(Into::into)
}

/// Structural comparison behind [`validate_batch_schema`].
///
/// # Errors
/// A [`SchemaMismatch`] describing the first difference.
pub fn check_schema(actual: &Schema, expected: &Schema) -> Result<(), SchemaMismatch> {
    let mismatch = |kind, position| SchemaMismatch {
        kind,
        position,
        expected: Arc::new(expected.clone()),
        actual: Arc::new(actual.clone()),
    };

    let exp = expected.fields();
    let act = actual.fields();
    if exp.len() != act.len() {
        return Err(mismatch(MismatchKind::ColumnCount, None));
    }
    if let Some(i) = exp.iter().zip(act.iter()).position(|(e, a)| e.name() != a.name()) {
        return Err(mismatch(MismatchKind::ColumnName, Some(i)));
    }
    if let Some(i) = exp
        .iter()
        .zip(act.iter())
        .position(|(e, a)| e.data_type() != a.data_type())
    {
        return Err(mismatch(MismatchKind::ColumnType, Some(i)));
    }
    Ok(())
}

/// Whether two schemas are structurally equal.
#[must_use]
pub fn schemas_match(a: &Schema, b: &Schema) -> bool {
    check_schema(a, b).is_ok()
}
