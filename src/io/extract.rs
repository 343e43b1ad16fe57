//! Byte-faithful extraction.
//!
//! Copies a stream to disk in fixed-size chunks through an [`AtomicFile`].
//! Without compression the output is byte-for-byte the input: no decoding, no
//! newline translation.

use crate::io::atomic::AtomicFile;
use crate::io::compression::Compression;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Bytes copied per read.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Copy `source` into `dest`, optionally compressing.
///
/// Returns the number of bytes read from `source`.
///
/// # Errors
/// Any read or write error; `dest` is left as it was and the temporary file
/// is removed.
pub fn extract_stream<R: Read + ?Sized>(
    source: &mut R,
    dest: impl AsRef<Path>,
    compression: Compression,
) -> Result<u64> {
    let dest = dest.as_ref();
    debug!("extracting to {} ({} compression)", dest.display(), compression.name());
    let mut out = AtomicFile::create(dest)?;
    let n = compression
        .encode_to(source, &mut out, CHUNK_SIZE)
        .with_context(|| format!("copy into {}", dest.display()))?;
    out.commit()?;
    Ok(n)
}
