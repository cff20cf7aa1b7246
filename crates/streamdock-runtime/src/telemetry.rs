//! Structured telemetry initialisation for the plugin.
//!
//! Log lines go to stderr and, unless disabled, to `plugin.log` in the
//! configured log directory. The host discards the plugin's stderr, so the
//! file is the usual place to look.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter, writer::BoxMakeWriter, writer::MakeWriterExt};

use streamdock_config::{Config, LogFormat, LogPaths, LogPathsError};

static TELEMETRY_GUARD: OnceCell<TelemetryHandle> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone)]
pub struct TelemetryHandle {
    log_file: Option<Utf8PathBuf>,
}

impl TelemetryHandle {
    /// File receiving log lines, when file logging is enabled.
    #[must_use]
    pub fn log_file(&self) -> Option<&Utf8Path> {
        self.log_file.as_deref()
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to prepare the log directory.
    #[error(transparent)]
    LogPaths(#[from] LogPathsError),
    /// Failed to open the log file.
    #[error("failed to open log file '{path}': {source}")]
    LogFile {
        /// Path of the log file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and later calls return the handle it produced.
///
/// # Errors
///
/// Returns a [`TelemetryError`] when the filter is invalid, the log file
/// cannot be opened, or another subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .cloned()
}

fn install_subscriber(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let log_file = match LogPaths::from_config(config)? {
        Some(paths) => Some(open_log_file(paths.log_file())?),
        None => None,
    };
    let ansi = log_file.is_none() && io::stderr().is_terminal();
    let handle = TelemetryHandle {
        log_file: log_file.as_ref().map(|(path, _)| path.clone()),
    };
    let writer = match log_file {
        Some((_, file)) => BoxMakeWriter::new(io::stderr.and(Mutex::new(file))),
        None => BoxMakeWriter::new(io::stderr),
    };

    let subscriber = build_subscriber(filter, config.log_format(), writer, ansi);
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    Ok(handle)
}

fn open_log_file(path: &Utf8Path) -> Result<(Utf8PathBuf, File), TelemetryError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|file| (path.to_path_buf(), file))
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn build_subscriber<W>(
    filter: EnvFilter,
    format: LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(writer)
        // Colour codes would end up in plugin.log.
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    }
}
