//! Per-unit outcome tracking and the final report.

use std::fmt;

/// One failed unit and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub reason: String,
}

/// Append-only record of succeeded and failed units, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    successes: Vec<String>,
    failures: Vec<Failure>,
}

impl ConversionSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, name: impl Into<String>) {
        self.successes.push(name.into());
    }

    pub fn record_failure(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(Failure {
            name: name.into(),
            reason: reason.into(),
        });
    }

    #[must_use]
    pub fn total_success(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn total_failure(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Render the human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion Summary")?;
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(f, "Success: {} file(s)", self.total_success())?;
        write!(f, "Failure: {} file(s)", self.total_failure())?;

        if !self.successes.is_empty() {
            write!(f, "\n\nSuccessful files:")?;
            for name in &self.successes {
                write!(f, "\n  - {name}")?;
            }
        }

        if !self.failures.is_empty() {
            write!(f, "\n\nFailed files:")?;
            for failure in &self.failures {
                write!(f, "\n  - {}: {}", failure.name, failure.reason)?;
            }
        }
        Ok(())
    }
}
