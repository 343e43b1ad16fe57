//! Testing utilities for conversions.
//!
//! This module provides helpers for writing tests against the converter:
//!
//! - **Fixtures**: write CSV files and build tar archives, including archives
//!   with hostile member names that the `tar` builder itself would refuse
//! - **Assertions**: read Parquet output back and check a directory for
//!   leftover temporary files
//!
//! # Quick Start
//!
//! ```no_run
//! use tabconv::testing::*;
//! use tabconv::{convert, ConvertOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let tmp = tempfile::tempdir()?;
//! let archive = tmp.path().join("data.tar.gz");
//! build_tar_gz(&archive, &[("a.csv", b"id,v\n1,2\n"), ("b.csv", b"id,v\n3,4\n")])?;
//!
//! let out = tmp.path().join("out");
//! let summary = convert(&archive, &out, &ConvertOptions::default())?;
//! assert_eq!(summary.total_success(), 2);
//! assert_eq!(parquet_row_count(out.join("a.parquet"))?, 1);
//! assert_no_temp_files(&out);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
