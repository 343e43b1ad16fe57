//! Error taxonomy for conversions.
//!
//! Library functions return [`anyhow::Result`] and attach context as they go.
//! The typed errors below travel inside [`anyhow::Error`] so callers (and tests)
//! can tell the failure classes apart with `downcast_ref`:
//!
//! - [`ConvertError`] - configuration problems and input problems
//! - [`SchemaMismatch`] - structural disagreement with the canonical schema
//! - [`SecurityViolation`] - unsafe archive member names

use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use std::path::PathBuf;

/// Configuration and input errors.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported conversion: {input} -> {output}")]
    UnsupportedRoute { input: String, output: String },

    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("input path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("member not found in archive: {0}")]
    MemberNotFound(String),

    #[error("failed to decode {origin}")]
    Decode {
        origin: String,
        #[source]
        source: ArrowError,
    },

    #[error("writer is already closed")]
    WriterClosed,
}

/// Which structural check failed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    ColumnCount,
    ColumnName,
    ColumnType,
}

/// A batch whose schema does not structurally equal the expected schema.
///
/// `position` is set for name and type mismatches. Both schemas are kept for
/// diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", describe_mismatch(.kind, .position, .expected, .actual))]
pub struct SchemaMismatch {
    pub kind: MismatchKind,
    pub position: Option<usize>,
    pub expected: SchemaRef,
    pub actual: SchemaRef,
}

fn describe_mismatch(
    kind: &MismatchKind,
    position: &Option<usize>,
    expected: &SchemaRef,
    actual: &SchemaRef,
) -> String {
    let exp = expected.fields();
    let act = actual.fields();
    match (kind, position) {
        (MismatchKind::ColumnName, Some(i)) => format!(
            "schema column name mismatch at position {i}: expected '{}', got '{}'",
            exp[*i].name(),
            act[*i].name()
        ),
        (MismatchKind::ColumnType, Some(i)) => format!(
            "schema type mismatch for column '{}': expected {}, got {}",
            exp[*i].name(),
            exp[*i].data_type(),
            act[*i].data_type()
        ),
        _ => format!(
            "schema column count mismatch: expected {} columns, got {}",
            exp.len(),
            act.len()
        ),
    }
}

/// Archive member names that would write outside the extraction directory.
#[derive(Debug, thiserror::Error)]
pub enum SecurityViolation {
    #[error("absolute path in archive member rejected: {member}")]
    AbsolutePath { member: String },

    #[error("path traversal detected in archive member: {member}")]
    ParentTraversal { member: String },

    #[error("path escapes extract directory: {member} -> {}", .resolved.display())]
    EscapesDirectory { member: String, resolved: PathBuf },
}
