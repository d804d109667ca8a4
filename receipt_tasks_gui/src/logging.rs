use std::path::Path;

use receipt_tasks_settings::LogSettings;
use thiserror::Error;
use tracing::warn;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: InitError,
    },
    #[error("failed to install the log subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the process-wide subscriber: stderr plus the configured log file.
///
/// When the log file cannot be opened, stderr logging is still installed and
/// the file error is reported through it.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let filter = parse_filter(&settings.filter)?;
    let (file, file_error) = match file_appender(&settings.file) {
        Ok(appender) => (Some(appender), None),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file.map(|writer| fmt::layer().with_ansi(false).with_writer(writer)))
        .try_init()?;

    if let Some(err) = file_error {
        warn!(error = %err, "log file unavailable, logging to stderr only");
    }
    Ok(())
}

fn parse_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|source| LoggingError::Filter {
        filter: filter.to_string(),
        source,
    })
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt_tasks.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|source| LoggingError::File {
            path: path.display().to_string(),
            source,
        })
}
