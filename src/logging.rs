//! Log output setup.
//!
//! DEBUG and INFO records go to stdout, WARN and ERROR to stderr. Lines carry
//! the level and the message only.

use tracing::Level;
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[default]
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING", alias = "WARN")]
    Warning,
    #[value(name = "ERROR")]
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. a second call
/// in the same process); the existing one is kept.
pub fn init_logging(level: LogLevel) -> bool {
    let stdout = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_filter(filter_fn(|meta| *meta.level() > Level::WARN));
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(filter_fn(|meta| *meta.level() <= Level::WARN));

    tracing_subscriber::registry()
        .with(stdout)
        .with(stderr)
        .with(level.as_filter())
        .try_init()
        .is_ok()
}
