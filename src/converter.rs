//! Conversion orchestration.
//!
//! [`convert`] picks one of three routes from the input and output kinds:
//!
//! | input   | output   | route |
//! |---------|----------|-------|
//! | text    | columnar | one CSV file to one Parquet file |
//! | archive | columnar | every CSV member to `<out>/<stem>.parquet`, schema inferred from the first member and enforced on all |
//! | archive | text     | every CSV member copied byte-for-byte to `<out>/<name>` (or `<name>.gz`) |
//!
//! Archive routes isolate failures per member: an error is recorded in the
//! [`ConversionSummary`] and the next member is processed. The single-file
//! route records its failure and also returns it.

use crate::error::ConvertError;
use crate::io::archive::{base_name, TarArchive};
use crate::io::compression::Compression;
use crate::io::csv::{
    CsvDecoder, DecodeOptions, DEFAULT_BATCH_ROWS, MAX_CHUNK_BYTES, MIN_CHUNK_BYTES,
};
use crate::io::extract::extract_stream;
use crate::io::parquet::ParquetFileWriter;
use crate::io::{copy_batches, BatchSink};
use crate::schema::{check_schema, infer_schema};
use crate::security::validate_member_path;
use crate::summary::ConversionSummary;
use anyhow::{Context, Result};
use arrow::datatypes::SchemaRef;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Extension of columnar output files.
pub const PARQUET_EXTENSION: &str = "parquet";

/// Input file suffixes that select the archive route.
pub const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar"];

/// What the input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputKind {
    /// A single delimited-text file.
    #[value(alias = "csv")]
    Text,
    /// A tar archive (optionally gzip-compressed) of delimited-text files.
    #[value(alias = "tar.gz")]
    Archive,
}

impl InputKind {
    /// Archive if the path ends in a known archive suffix, text otherwise.
    pub fn detect(path: impl AsRef<Path>) -> Self {
        let lower = path.as_ref().to_string_lossy().to_lowercase();
        if ARCHIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Self::Archive
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Archive => "archive",
        })
    }
}

/// What to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputKind {
    /// Parquet.
    #[default]
    #[value(alias = "parquet")]
    Columnar,
    /// Raw extracted CSV.
    #[value(alias = "csv")]
    Text,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Columnar => "columnar",
            Self::Text => "text",
        })
    }
}

/// The three supported conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    TextToColumnar,
    ArchiveToColumnar,
    ArchiveToText,
}

impl Route {
    /// Pick the route for an (input, output) pair.
    ///
    /// # Errors
    /// [`ConvertError::UnsupportedRoute`] for text to text.
    pub fn select(input: InputKind, output: OutputKind) -> Result<Self> {
        match (input, output) {
            (InputKind::Text, OutputKind::Columnar) => Ok(Self::TextToColumnar),
            (InputKind::Archive, OutputKind::Columnar) => Ok(Self::ArchiveToColumnar),
            (InputKind::Archive, OutputKind::Text) => Ok(Self::ArchiveToText),
            (InputKind::Text, OutputKind::Text) => Err(ConvertError::UnsupportedRoute {
                input: input.to_string(),
                output: output.to_string(),
            }
            .into()),
        }
    }
}

/// Conversion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Input kind; detected from the input path when `None`.
    pub input_kind: Option<InputKind>,
    pub output_kind: OutputKind,
    /// Read buffer per decode step, in MiB.
    pub block_size_mb: f64,
    /// Max rows per Parquet row group; encoder default when `None`.
    pub row_group_size: Option<usize>,
    /// Rows sampled from the first archive member for schema inference.
    pub schema_sample_rows: usize,
    /// Gzip raw extraction output. Ignored for columnar output.
    pub gzip: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_kind: None,
            output_kind: OutputKind::Columnar,
            block_size_mb: 1.0,
            row_group_size: None,
            schema_sample_rows: 1000,
            gzip: false,
        }
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn with_input_kind(mut self, kind: InputKind) -> Self {
        self.input_kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    #[must_use]
    pub fn with_block_size_mb(mut self, mb: f64) -> Self {
        self.block_size_mb = mb;
        self
    }

    #[must_use]
    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = Some(rows);
        self
    }

    #[must_use]
    pub fn with_schema_sample_rows(mut self, rows: usize) -> Self {
        self.schema_sample_rows = rows;
        self
    }

    #[must_use]
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// Reject non-positive sizes.
    ///
    /// # Errors
    /// [`ConvertError::InvalidOption`] naming the offending option.
    pub fn validate(&self) -> Result<()> {
        if !(self.block_size_mb.is_finite() && self.block_size_mb > 0.0) {
            return Err(ConvertError::InvalidOption {
                name: "block_size_mb",
                reason: format!("must be > 0, got {}", self.block_size_mb),
            }
            .into());
        }
        if self.row_group_size == Some(0) {
            return Err(ConvertError::InvalidOption {
                name: "row_group_size",
                reason: "must be > 0, got 0".into(),
            }
            .into());
        }
        if self.schema_sample_rows == 0 {
            return Err(ConvertError::InvalidOption {
                name: "schema_sample_rows",
                reason: "must be > 0, got 0".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Read buffer size in bytes, clamped to 4 KiB..=256 MiB.
    #[must_use]
    pub fn chunk_bytes(&self) -> usize {
        let bytes = (self.block_size_mb * 1024.0 * 1024.0) as usize;
        bytes.clamp(MIN_CHUNK_BYTES, MAX_CHUNK_BYTES)
    }

    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::default()
            .with_chunk_bytes(self.chunk_bytes())
            .with_batch_rows(DEFAULT_BATCH_ROWS)
    }

    fn compression(&self) -> Compression {
        if self.gzip {
            Compression::Gzip
        } else {
            Compression::None
        }
    }
}

/// Input must exist and be a regular file.
///
/// # Errors
/// [`ConvertError::InputNotFound`] or [`ConvertError::NotAFile`].
pub fn validate_input_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()).into());
    }
    if !path.is_file() {
        return Err(ConvertError::NotAFile(path.to_path_buf()).into());
    }
    Ok(())
}

/// Run one conversion and return its summary.
///
/// # Errors
/// Invocation-level failures: invalid options, unsupported route, unreadable
/// input or archive, and any failure of the single-file route. Per-member
/// failures in archive routes are not errors; they are in the summary.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionSummary> {
    let mut summary = ConversionSummary::new();
    convert_into(input, output, options, &mut summary)?;
    Ok(summary)
}

/// Like [`convert`], but records into a caller-owned summary so it stays
/// readable when the invocation fails.
///
/// # Errors
/// See [`convert`].
pub fn convert_into(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
    summary: &mut ConversionSummary,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    options.validate()?;
    let input_kind = options
        .input_kind
        .unwrap_or_else(|| InputKind::detect(input));
    let route = Route::select(input_kind, options.output_kind)?;

    if options.gzip && options.output_kind == OutputKind::Columnar {
        warn!("--gzip has no effect with columnar output");
    }

    validate_input_path(input)?;

    match route {
        Route::TextToColumnar => convert_text_to_columnar(input, output, options, summary),
        Route::ArchiveToColumnar => convert_archive_to_columnar(input, output, options, summary),
        Route::ArchiveToText => extract_archive_to_text(input, output, options, summary),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn convert_text_to_columnar(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    summary: &mut ConversionSummary,
) -> Result<()> {
    let name = display_name(input);
    match write_text_file(input, output, options) {
        Ok(Some(rows)) => {
            info!("Converted: {} -> {} ({rows} row(s))", input.display(), output.display());
            summary.record_success(name);
            Ok(())
        }
        Ok(None) => {
            warn!("Empty CSV file: {}", input.display());
            summary.record_success(name);
            Ok(())
        }
        Err(e) => {
            error!("Failed to convert {}: {e:#}", input.display());
            summary.record_failure(name, format!("{e:#}"));
            Err(e)
        }
    }
}

/// Returns `None` when the input has no data rows; no output is written then.
fn write_text_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<Option<u64>> {
    let decoder = CsvDecoder::new(options.decode_options());
    let mut batches = decoder.open_path(input, None)?;

    let Some(first) = batches.next().transpose()? else {
        return Ok(None);
    };
    let schema: SchemaRef = first.schema();

    let mut writer = ParquetFileWriter::create(output, schema, options.row_group_size)?;
    copy_batches(std::iter::once(Ok(first)).chain(batches), &mut writer, None)?;
    writer.finish().map(Some)
}

/// Output name for a member in the columnar route: stem + `.parquet`.
#[must_use]
pub fn parquet_file_name(member: &str) -> String {
    Path::new(base_name(member))
        .with_extension(PARQUET_EXTENSION)
        .to_string_lossy()
        .into_owned()
}

fn convert_archive_to_columnar(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    summary: &mut ConversionSummary,
) -> Result<()> {
    let archive = TarArchive::open(input)?;
    let members = archive.csv_members()?;
    let Some(first) = members.first() else {
        info!("No CSV members found in {}", input.display());
        return Ok(());
    };

    let schema = infer_schema(
        &archive,
        first,
        options.schema_sample_rows,
        options.decode_options(),
    )?;

    fs::create_dir_all(output).with_context(|| format!("mkdir -p {}", output.display()))?;

    let decoder = CsvDecoder::new(options.decode_options());
    for member in &members {
        let name = base_name(member).to_string();
        let out_file = output.join(parquet_file_name(member));
        let result = archive.with_member(member, |stream| {
            let batches = decoder.open(stream, Some(schema.clone()), member.as_str())?;
            // header-only members produce no batches, so check the header itself
            let header = batches.schema();
            if !header.fields().is_empty() {
                check_schema(&header, &schema)?;
            }
            let mut writer =
                ParquetFileWriter::create(&out_file, schema.clone(), options.row_group_size)?;
            copy_batches(batches, &mut writer, Some(&schema))?;
            writer.finish()
        });
        match result {
            Ok(rows) => {
                info!("Converted: {member} -> {} ({rows} row(s))", out_file.display());
                summary.record_success(name);
            }
            Err(e) => {
                error!("Failed to convert member {member}: {e:#}");
                summary.record_failure(name, format!("{e:#}"));
            }
        }
    }
    Ok(())
}

fn extract_archive_to_text(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    summary: &mut ConversionSummary,
) -> Result<()> {
    let archive = TarArchive::open(input)?;
    let members = archive.csv_members()?;

    fs::create_dir_all(output).with_context(|| format!("mkdir -p {}", output.display()))?;

    let compression = options.compression();
    for member in &members {
        let name = base_name(member).to_string();
        let result = extract_member(&archive, member, output, compression);
        match result {
            Ok(out_file) => {
                info!("Extracted: {member} -> {}", out_file.display());
                summary.record_success(name);
            }
            Err(e) => {
                error!("Failed to extract member {member}: {e:#}");
                summary.record_failure(name, format!("{e:#}"));
            }
        }
    }
    Ok(())
}

fn extract_member(
    archive: &TarArchive,
    member: &str,
    output: &Path,
    compression: Compression,
) -> Result<PathBuf> {
    validate_member_path(member, output)?;
    let out_file = output.join(format!("{}{}", base_name(member), compression.output_suffix()));
    archive.with_member(member, |stream| extract_stream(stream, &out_file, compression))?;
    Ok(out_file)
}
