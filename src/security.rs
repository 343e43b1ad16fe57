//! Archive member name sanitization.
//!
//! Every member name is checked here before extraction touches the filesystem.

use crate::error::SecurityViolation;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Validate an archive member name against an extraction directory.
///
/// Rules, applied in order:
/// 1. `\` separators are normalized to `/`
/// 2. absolute names are rejected
/// 3. any `..` segment is rejected
/// 4. the name is joined onto `extract_dir` and both paths are canonicalized
/// 5. the canonical destination must be `extract_dir` itself or live below it
///
/// Returns `extract_dir` joined with the normalized name. The extraction
/// directory must exist.
///
/// # Errors
/// A [`SecurityViolation`] for unsafe names, or an I/O error if the extraction
/// directory cannot be canonicalized.
pub fn validate_member_path(member: &str, extract_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let extract_dir = extract_dir.as_ref();
    let normalized = member.replace('\\', "/");

    if normalized.starts_with('/') || Path::new(&normalized).is_absolute() {
        return Err(SecurityViolation::AbsolutePath {
            member: member.to_string(),
        }
        .into());
    }

    if normalized.split('/').any(|part| part == "..") {
        return Err(SecurityViolation::ParentTraversal {
            member: member.to_string(),
        }
        .into());
    }

    let safe_path: PathBuf = normalized
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(extract_dir.to_path_buf(), |acc, part| acc.join(part));

    let root = extract_dir
        .canonicalize()
        .with_context(|| format!("canonicalize {}", extract_dir.display()))?;
    let resolved = canonicalize_lenient(&safe_path)?;

    if !resolved.starts_with(&root) {
        return Err(SecurityViolation::EscapesDirectory {
            member: member.to_string(),
            resolved,
        }
        .into());
    }

    Ok(safe_path)
}

/// Canonicalize the deepest existing ancestor of `path`, then re-append the
/// components that do not exist yet.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut pending = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(base) => {
                return Ok(pending.iter().rev().fold(base, |acc, part| acc.join(part)));
            }
            Err(_) => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Ok(path.to_path_buf());
                };
                pending.push(name.to_os_string());
                existing = parent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_canonicalize_keeps_missing_tail() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let resolved = canonicalize_lenient(&tmp.path().join("a/b/c.csv")).unwrap();
        assert_eq!(resolved, root.join("a").join("b").join("c.csv"));
    }

    #[test]
    fn current_dir_segments_are_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let out = validate_member_path("./data//x.csv", tmp.path()).unwrap();
        assert_eq!(out, tmp.path().join("data").join("x.csv"));
    }
}
