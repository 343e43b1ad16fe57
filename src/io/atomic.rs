//! Crash-safe file output.
//!
//! [`AtomicFile`] writes into a uniquely named temporary file that lives in the
//! same directory as the destination, so the final rename never crosses a
//! filesystem boundary. [`AtomicFile::commit`] flushes, fsyncs and renames over
//! the destination. Dropping an uncommitted [`AtomicFile`] (or calling
//! [`AtomicFile::abort`]) deletes the temporary file and leaves whatever was at
//! the destination untouched.
//!
//! ```no_run
//! use std::io::Write;
//! use tabconv::io::atomic::AtomicFile;
//! # fn main() -> anyhow::Result<()> {
//! let mut out = AtomicFile::create("out/report.csv")?;
//! out.write_all(b"id,name\n1,a\n")?;
//! out.commit()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Suffix carried by every in-flight temporary file.
pub const TEMP_SUFFIX: &str = ".tmp";

/// A pending write to `path` that becomes visible only on [`commit`](Self::commit).
#[derive(Debug)]
pub struct AtomicFile {
    path: PathBuf,
    temp: Option<BufWriter<NamedTempFile>>,
}

impl AtomicFile {
    /// Create a temporary file next to `path`.
    ///
    /// # Errors
    /// Fails with [`io::ErrorKind::NotFound`] if the destination directory does
    /// not exist; no temporary file is created in that case.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("output directory does not exist: {}", dir.display()),
            )
            .into());
        }

        let prefix = format!(
            ".{}.",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&dir)
            .with_context(|| format!("create temporary file in {}", dir.display()))?;
        debug!("staging {} at {}", path.display(), temp.path().display());

        Ok(Self {
            path,
            temp: Some(BufWriter::new(temp)),
        })
    }

    /// Final destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the temporary file, while it still exists.
    #[must_use]
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_ref().map(|w| w.get_ref().path())
    }

    /// Flush, fsync and atomically rename the temporary file over the destination.
    ///
    /// # Errors
    /// Returns an error if flushing, syncing or renaming fails. The temporary
    /// file is removed in every failure case.
    pub fn commit(mut self) -> Result<PathBuf> {
        let writer = self
            .temp
            .take()
            .context("atomic file already finalized")?;
        let temp = writer
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .with_context(|| format!("flush {}", self.path.display()))?;
        temp.as_file()
            .sync_all()
            .with_context(|| format!("fsync {}", temp.path().display()))?;
        temp.persist(&self.path)
            .with_context(|| format!("rename into {}", self.path.display()))?;
        sync_parent_dir(&self.path);
        Ok(std::mem::take(&mut self.path))
    }

    /// Discard everything written so far.
    pub fn abort(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if let Some(writer) = self.temp.take() {
            let (temp, _) = writer.into_parts();
            debug!("discarding {}", temp.path().display());
            if let Err(e) = temp.close() {
                debug!("failed to remove temporary file: {e}");
            }
        }
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<NamedTempFile>> {
        self.temp
            .as_mut()
            .ok_or_else(|| io::Error::other("atomic file already finalized"))
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        self.discard();
    }
}

/// Best-effort fsync of the directory entry after a rename.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Ok(d) = std::fs::File::open(dir) {
        let _ = d.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
