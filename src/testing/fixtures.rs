//! Input fixtures: CSV files and tar archives.

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One entry to place in a test archive.
#[derive(Debug, Clone, Copy)]
pub enum TarEntry<'a> {
    /// Regular file with raw contents.
    File(&'a str, &'a [u8]),
    /// Directory entry.
    Dir(&'a str),
}

/// Write `contents` to `dir/name` and return the path.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_csv_file(dir: impl AsRef<Path>, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.as_ref().join(name);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// A CSV document with an `id,name,score` header and `rows` data rows.
#[must_use]
pub fn sample_csv(rows: usize) -> String {
    let mut out = String::from("id,name,score\n");
    for i in 0..rows {
        out.push_str(&format!("{i},name{i},{}.5\n", i * 10));
    }
    out
}

/// Build a gzip-compressed tar archive of regular files.
///
/// Member names are written verbatim into the header, so names such as
/// `../x.csv` or `/etc/x.csv` are stored exactly as given.
///
/// # Errors
/// Returns an error if a name exceeds 99 bytes or the archive cannot be written.
pub fn build_tar_gz(path: impl AsRef<Path>, files: &[(&str, &[u8])]) -> Result<()> {
    let entries: Vec<TarEntry<'_>> = files.iter().map(|&(n, d)| TarEntry::File(n, d)).collect();
    build_tar_entries(path, &entries, true)
}

/// Build an uncompressed tar archive of regular files.
///
/// # Errors
/// See [`build_tar_gz`].
pub fn build_tar(path: impl AsRef<Path>, files: &[(&str, &[u8])]) -> Result<()> {
    let entries: Vec<TarEntry<'_>> = files.iter().map(|&(n, d)| TarEntry::File(n, d)).collect();
    build_tar_entries(path, &entries, false)
}

/// Build a tar archive from arbitrary entries, optionally gzip-compressed.
///
/// # Errors
/// See [`build_tar_gz`].
pub fn build_tar_entries(path: impl AsRef<Path>, entries: &[TarEntry<'_>], gzip: bool) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    if gzip {
        let enc = GzEncoder::new(file, flate2::Compression::default());
        let enc = append_entries(enc, entries)?;
        enc.finish()?.flush()?;
    } else {
        append_entries(file, entries)?.flush()?;
    }
    Ok(())
}

fn append_entries<W: Write>(out: W, entries: &[TarEntry<'_>]) -> Result<W> {
    let mut builder = tar::Builder::new(out);
    for entry in entries {
        let (name, data, kind) = match *entry {
            TarEntry::File(name, data) => (name, data, tar::EntryType::Regular),
            TarEntry::Dir(name) => (name, &[][..], tar::EntryType::Directory),
        };
        let mut header = tar::Header::new_gnu();
        set_raw_name(&mut header, name)?;
        header.set_size(data.len() as u64);
        header.set_mode(if kind.is_dir() { 0o755 } else { 0o644 });
        header.set_entry_type(kind);
        header.set_cksum();
        builder
            .append(&header, data)
            .with_context(|| format!("append {name}"))?;
    }
    Ok(builder.into_inner()?)
}

fn set_raw_name(header: &mut tar::Header, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let slot = &mut header.as_old_mut().name;
    if bytes.len() >= slot.len() {
        bail!("member name too long for test archive: {name}");
    }
    slot.fill(0);
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}
