//! Derives the on-disk locations the plugin writes to.
//!
//! Only the log file lives on disk; settings are persisted by the host.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::Config;
use crate::logging::LOG_FILE_NAME;

/// Canonical paths for the plugin log.
#[derive(Debug, Clone)]
pub struct LogPaths {
    log_dir: Utf8PathBuf,
    log_file: Utf8PathBuf,
}

impl LogPaths {
    /// Derives log paths from the configuration and creates the directory.
    ///
    /// Returns `Ok(None)` when file logging is disabled by an empty
    /// `log_dir`.
    pub fn from_config(config: &Config) -> Result<Option<Self>, LogPathsError> {
        let Some(log_dir) = config.log_dir() else {
            return Ok(None);
        };
        fs::create_dir_all(log_dir).map_err(|source| LogPathsError::LogDirectory {
            path: log_dir.to_path_buf(),
            source,
        })?;
        Ok(Some(Self {
            log_file: log_dir.join(LOG_FILE_NAME),
            log_dir: log_dir.to_path_buf(),
        }))
    }

    /// Directory holding the log file.
    pub fn log_dir(&self) -> &Utf8Path {
        self.log_dir.as_path()
    }

    /// Path to `plugin.log`.
    pub fn log_file(&self) -> &Utf8Path {
        self.log_file.as_path()
    }
}

/// Errors raised while preparing log paths.
#[derive(Debug, Error)]
pub enum LogPathsError {
    /// Creating the log directory failed.
    #[error("failed to prepare log directory '{path}': {source}")]
    LogDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
