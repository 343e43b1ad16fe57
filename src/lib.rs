//! # tabconv
//!
//! A **streaming converter** for tabular data. It turns a single CSV file or a
//! tar archive of CSV files into Parquet, or extracts the CSV members of an
//! archive back out as plain (optionally gzip-compressed) files.
//!
//! ## Key Features
//!
//! - **Bounded memory** - CSV is decoded in fixed-size batches and each batch is
//!   written and dropped before the next one is read
//! - **Shared schema across members** - the schema sampled from the first archive
//!   member is enforced on every other member
//! - **Per-member isolation** - one bad member is recorded as a failure and the
//!   rest of the archive is still converted
//! - **Atomic outputs** - every file is written to a temporary sibling and renamed
//!   into place only after a successful flush
//! - **Path safety** - archive member names are checked against absolute paths
//!   and directory traversal before anything is written
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabconv::{convert, ConvertOptions, OutputKind};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! // CSV archive -> one Parquet file per member
//! let summary = convert("data.tar.gz", "out/", &ConvertOptions::default())?;
//! println!("{summary}");
//!
//! // CSV archive -> gzip-compressed CSV files
//! let opts = ConvertOptions::default()
//!     .with_output_kind(OutputKind::Text)
//!     .with_gzip(true);
//! convert("data.tar.gz", "extracted/", &opts)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Routes
//!
//! | input   | output  | result                                          |
//! |---------|---------|-------------------------------------------------|
//! | CSV     | Parquet | one Parquet file at the output path             |
//! | archive | Parquet | `<stem>.parquet` per CSV member in the output dir |
//! | archive | CSV     | `<basename>.csv[.gz]` per CSV member            |
//!
//! CSV to CSV is rejected with [`ConvertError::UnsupportedRoute`].
//!
//! ## Errors
//!
//! Fallible functions return [`anyhow::Result`]. Typed causes such as
//! [`ConvertError`], [`SchemaMismatch`] and [`SecurityViolation`] can be
//! recovered with `downcast_ref`.

pub mod cli;
pub mod converter;
pub mod error;
pub mod io;
pub mod logging;
pub mod schema;
pub mod security;
pub mod summary;
pub mod testing;

pub use converter::{
    convert, convert_into, parquet_file_name, validate_input_path, ConvertOptions, InputKind,
    OutputKind, Route,
};
pub use error::{ConvertError, MismatchKind, SchemaMismatch, SecurityViolation};
pub use io::archive::{ArchiveMember, TarArchive};
pub use io::compression::Compression;
pub use io::csv::{CsvDecoder, DecodeOptions};
pub use io::parquet::ParquetFileWriter;
pub use io::{copy_batches, BatchSink};
pub use logging::{init_logging, LogLevel};
pub use schema::{check_schema, infer_schema, schemas_match, validate_batch_schema};
pub use security::validate_member_path;
pub use summary::{ConversionSummary, Failure};
