//! Sets up `tracing` output for the command line application.

use std::{fs::OpenOptions, io, path::Path, sync::Arc};

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// The log level for the number of `-v` flags given on the command line.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global tracing subscriber.
///
/// Logs are written to stderr, so that reports on stdout are not interleaved
/// with log lines. `RUST_LOG` overrides the level chosen by `verbosity`.
/// If `log_file` is given, logs at debug level and above are also appended to it.
///
/// # Errors
/// Returns an error if the log file cannot be opened or if a global
/// subscriber has already been installed.
pub fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for_verbosity(verbosity).into())
        .from_env_lossy();

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    let file_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(file_log)
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::level_for_verbosity;

    #[test]
    fn more_verbosity_lowers_level() {
        assert_eq!(level_for_verbosity(0), LevelFilter::INFO);
        assert_eq!(level_for_verbosity(1), LevelFilter::DEBUG);
        assert_eq!(level_for_verbosity(2), LevelFilter::TRACE);
        assert_eq!(level_for_verbosity(9), LevelFilter::TRACE);
    }

    #[test]
    fn missing_log_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("tally.log");

        let result = super::setup_logging(0, Some(&path));

        assert!(result.is_err());
    }
}
