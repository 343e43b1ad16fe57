//! Tar archive access.
//!
//! A [`TarArchive`] is a handle to an archive on disk. Every operation reopens
//! the file and walks the entries from the start, so no decoder state is held
//! between members and at most one member stream is open at a time.
//!
//! Member contents are exposed through a callback ([`TarArchive::with_member`])
//! instead of being buffered, which keeps memory bounded by the consumer's
//! chunk size rather than the member size.

use crate::error::ConvertError;
use crate::io::compression::auto_detect_reader;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix (case-insensitive) that marks a member as convertible.
pub const CSV_SUFFIX: &str = ".csv";

/// One entry of an archive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Raw member name as stored in the archive.
    pub name: String,
    /// Whether the entry is a regular file.
    pub is_file: bool,
}

impl ArchiveMember {
    /// Regular file whose name ends in `.csv`, ignoring case.
    #[must_use]
    pub fn is_convertible(&self) -> bool {
        self.is_file && self.name.to_lowercase().ends_with(CSV_SUFFIX)
    }

    /// Last path segment of the member name, with `\` treated as a separator.
    #[must_use]
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Last path segment of an archive member name.
#[must_use]
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(name)
}

/// Handle to a (possibly gzip-compressed) tar archive.
#[derive(Debug, Clone)]
pub struct TarArchive {
    path: PathBuf,
}

impl TarArchive {
    /// Open an archive handle. The file must exist.
    ///
    /// # Errors
    /// Returns [`ConvertError::InputNotFound`] if `path` does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConvertError::InputNotFound(path).into());
        }
        Ok(Self { path })
    }

    /// Archive path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<tar::Archive<Box<dyn Read>>> {
        let f = File::open(&self.path).with_context(|| format!("open {}", self.path.display()))?;
        let rdr = auto_detect_reader(f, &self.path)
            .with_context(|| format!("setup decompression for {}", self.path.display()))?;
        Ok(tar::Archive::new(rdr))
    }

    /// List every entry in archive order.
    ///
    /// # Errors
    /// Returns an error if the archive cannot be opened or is corrupt.
    pub fn members(&self) -> Result<Vec<ArchiveMember>> {
        let mut archive = self.reader()?;
        let mut out = Vec::new();
        let entries = archive
            .entries()
            .with_context(|| format!("read entries of {}", self.path.display()))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("read entry of {}", self.path.display()))?;
            out.push(ArchiveMember {
                name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
                is_file: entry.header().entry_type().is_file(),
            });
        }
        Ok(out)
    }

    /// Names of the convertible members, sorted.
    ///
    /// # Errors
    /// See [`members`](Self::members).
    pub fn csv_members(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .members()?
            .into_iter()
            .filter(ArchiveMember::is_convertible)
            .map(|m| m.name)
            .collect();
        names.sort();
        debug!("{} CSV member(s) in {}", names.len(), self.path.display());
        Ok(names)
    }

    /// Run `f` over a streaming reader of the regular-file member `name`.
    ///
    /// The first entry with a matching name is used.
    ///
    /// # Errors
    /// Returns [`ConvertError::MemberNotFound`] if no regular-file entry has
    /// that name, or any error produced by `f`.
    pub fn with_member<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut dyn Read) -> Result<T>,
    ) -> Result<T> {
        let mut archive = self.reader()?;
        let entries = archive
            .entries()
            .with_context(|| format!("read entries of {}", self.path.display()))?;
        for entry in entries {
            let mut entry =
                entry.with_context(|| format!("read entry of {}", self.path.display()))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            if String::from_utf8_lossy(&entry.path_bytes()) == name {
                return f(&mut entry);
            }
        }
        Err(ConvertError::MemberNotFound(name.to_string()).into())
    }
}
