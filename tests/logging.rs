use tabconv::{init_logging, LogLevel};

// Only test in this binary: the global subscriber is installed once per process.
#[test]
fn second_init_keeps_first_subscriber() {
    assert!(init_logging(LogLevel::Debug));
    assert!(!init_logging(LogLevel::Error));
    tracing::info!("still logging after a repeated init");
}
