use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tabconv::cli::Cli;
use tabconv::{InputKind, LogLevel, OutputKind};

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(["tabconv"].iter().chain(args))
}

#[test]
fn defaults() {
    let cli = parse(&["--input", "data.csv", "--output", "data.parquet"]).unwrap();
    assert_eq!(cli.input, PathBuf::from("data.csv"));
    assert_eq!(cli.input_type, None);
    assert_eq!(cli.output_type, OutputKind::Columnar);
    assert_eq!(cli.block_size_mb, 1.0);
    assert_eq!(cli.row_group_size, None);
    assert_eq!(cli.schema_sample_rows, 1000);
    assert!(!cli.gzip);
    assert_eq!(cli.log_level, LogLevel::Info);

    let opts = cli.options();
    assert_eq!(opts.input_kind, Some(InputKind::Text));
    opts.validate().unwrap();
}

#[test]
fn input_type_is_detected_from_extension() {
    let cli = parse(&["--input", "DUMP.TGZ", "--output", "out"]).unwrap();
    assert_eq!(cli.options().input_kind, Some(InputKind::Archive));
}

#[test]
fn type_aliases() {
    let cli = parse(&[
        "--input", "x", "--output", "y", "--input-type", "tar.gz", "--output-type", "csv",
        "--gzip",
    ])
    .unwrap();
    assert_eq!(cli.input_type, Some(InputKind::Archive));
    assert_eq!(cli.output_type, OutputKind::Text);
    assert!(cli.options().gzip);

    let cli = parse(&[
        "--input", "x", "--output", "y", "--input-type", "csv", "--output-type", "parquet",
    ])
    .unwrap();
    assert_eq!(cli.input_type, Some(InputKind::Text));
    assert_eq!(cli.output_type, OutputKind::Columnar);
}

#[test]
fn log_levels_ignore_case_and_accept_warn() {
    for (arg, level) in [
        ("DEBUG", LogLevel::Debug),
        ("info", LogLevel::Info),
        ("WARN", LogLevel::Warning),
        ("warning", LogLevel::Warning),
        ("Error", LogLevel::Error),
    ] {
        let cli = parse(&["--input", "x", "--output", "y", "--log-level", arg]).unwrap();
        assert_eq!(cli.log_level, level, "{arg}");
    }
}

#[test]
fn sizes_must_be_positive() {
    for args in [
        ["--block-size-mb", "0"],
        ["--block-size-mb", "nan"],
        ["--row-group-size", "0"],
        ["--schema-sample-rows", "0"],
        ["--schema-sample-rows", "ten"],
    ] {
        let mut all = vec!["--input", "x", "--output", "y"];
        all.extend(args);
        let err = parse(&all).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation, "{args:?}");
        assert_eq!(err.exit_code(), 2);
    }
}

#[test]
fn sizes_are_parsed() {
    let cli = parse(&[
        "--input", "x", "--output", "y", "--block-size-mb", "0.25", "--row-group-size", "500",
        "--schema-sample-rows", "50",
    ])
    .unwrap();
    let opts = cli.options();
    assert_eq!(opts.block_size_mb, 0.25);
    assert_eq!(opts.row_group_size, Some(500));
    assert_eq!(opts.schema_sample_rows, 50);
}

#[test]
fn input_and_output_are_required() {
    let err = parse(&["--input", "x"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn unknown_type_is_rejected() {
    let err = parse(&["--input", "x", "--output", "y", "--output-type", "json"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}
