use tabconv::ConversionSummary;

#[test]
fn empty_report_has_counts_only() {
    let s = ConversionSummary::new();
    assert_eq!(
        s.report(),
        "Conversion Summary\n\
         ========================================\n\
         Success: 0 file(s)\n\
         Failure: 0 file(s)"
    );
}

#[test]
fn report_lists_units_in_recorded_order() {
    let mut s = ConversionSummary::new();
    s.record_success("b.csv");
    s.record_failure("c.csv", "schema column count mismatch: expected 2 columns, got 3");
    s.record_success("a.csv");

    assert_eq!(s.total_success(), 2);
    assert_eq!(s.total_failure(), 1);
    assert_eq!(
        s.to_string(),
        "Conversion Summary\n\
         ========================================\n\
         Success: 2 file(s)\n\
         Failure: 1 file(s)\n\
         \n\
         Successful files:\n  \
         - b.csv\n  \
         - a.csv\n\
         \n\
         Failed files:\n  \
         - c.csv: schema column count mismatch: expected 2 columns, got 3"
    );
}

#[test]
fn failures_only_omits_success_block() {
    let mut s = ConversionSummary::new();
    s.record_failure("x.csv", "boom");
    let report = s.report();
    assert!(!report.contains("Successful files:"));
    assert!(report.ends_with("Failed files:\n  - x.csv: boom"));
    assert_eq!(s.failures()[0].reason, "boom");
}
