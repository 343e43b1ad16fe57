//! Compression detection and stream wrapping.
//!
//! Only gzip is needed: archives may arrive gzip-compressed (`.tar.gz`, `.tgz`)
//! or plain (`.tar`), and raw extraction can optionally gzip its output.
//!
//! ## Detection
//!
//! File extensions are checked first, falling back to magic bytes only when the
//! extension says nothing. This avoids touching the stream in the common case
//! and still handles mislabeled inputs.

use anyhow::Result;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

/// Supported stream compressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// Human-readable codec name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
        }
    }

    /// Lowercase file extensions (with leading dot) associated with the codec.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::None => &[],
            Self::Gzip => &[".gz", ".gzip", ".tgz"],
        }
    }

    /// Magic byte signature, if the codec has one.
    #[must_use]
    pub fn magic_bytes(self) -> Option<&'static [u8]> {
        match self {
            Self::None => None,
            Self::Gzip => Some(&[0x1f, 0x8b]),
        }
    }

    /// Extension appended to output files written with this codec.
    #[must_use]
    pub fn output_suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => ".gz",
        }
    }

    /// Detect compression from a path's extension (case-insensitive).
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let lower = path.as_ref().to_string_lossy().to_lowercase();
        [Self::Gzip]
            .into_iter()
            .find(|c| c.extensions().iter().any(|ext| lower.ends_with(ext)))
    }

    /// Detect compression by peeking at the start of a buffered stream.
    ///
    /// The reader is not advanced.
    pub fn from_magic<R: BufRead>(reader: &mut R) -> std::io::Result<Self> {
        let buf = reader.fill_buf()?;
        Ok([Self::Gzip]
            .into_iter()
            .find(|c| c.magic_bytes().is_some_and(|m| buf.starts_with(m)))
            .unwrap_or(Self::None))
    }

    /// Wrap a reader with the matching decompressor.
    pub fn wrap_reader<'a, R: Read + 'a>(self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Self::None => Box::new(reader),
            Self::Gzip => Box::new(MultiGzDecoder::new(reader)),
        }
    }

    /// Stream everything from `src` into `dst`, compressing on the way.
    ///
    /// Copies in `chunk_size` pieces so memory stays bounded regardless of
    /// input size. Returns the number of uncompressed bytes read from `src`.
    ///
    /// # Errors
    /// Any read, write or compressor error.
    pub fn encode_to<R: Read + ?Sized, W: Write>(
        self,
        src: &mut R,
        dst: &mut W,
        chunk_size: usize,
    ) -> Result<u64> {
        match self {
            Self::None => copy_chunked(src, dst, chunk_size),
            Self::Gzip => {
                let mut enc = GzEncoder::new(dst, flate2::Compression::default());
                let n = copy_chunked(src, &mut enc, chunk_size)?;
                enc.try_finish()?;
                Ok(n)
            }
        }
    }
}

/// Open a possibly-compressed file, detecting the codec by extension and then
/// by magic bytes.
///
/// # Errors
/// Returns an error if peeking at the stream fails.
pub fn auto_detect_reader<'a, R: Read + 'a>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read + 'a>> {
    if let Some(codec) = Compression::from_extension(&path_hint) {
        return Ok(codec.wrap_reader(reader));
    }
    let mut buffered = BufReader::new(reader);
    let codec = Compression::from_magic(&mut buffered)?;
    Ok(codec.wrap_reader(buffered))
}

fn copy_chunked<R: Read + ?Sized, W: Write>(
    src: &mut R,
    dst: &mut W,
    chunk_size: usize,
) -> Result<u64> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}
