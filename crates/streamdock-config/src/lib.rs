//! Layered configuration for the Stream Dock plugin runtime.
//!
//! Settings that govern how the plugin executable behaves (where it finds
//! the host, how it logs) are resolved with `ortho_config`: built-in
//! defaults, then an optional TOML file named by `--config-path` or
//! `STREAMDOCK_CONFIG_PATH`, then `STREAMDOCK_*` environment variables, then
//! command-line flags. The host's launch arguments (`-port`, `-pluginUUID`,
//! and friends) are not configuration; they are parsed by the runtime.

use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod paths;

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_DIR_NAME, DEFAULT_LOG_FILTER, default_host, default_log_dir,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LOG_FILE_NAME, LogFormat, LogFormatParseError};
pub use paths::{LogPaths, LogPathsError};

/// Command-line flags consumed by the configuration loader.
///
/// Keep in sync with the fields of [`Config`]; the runtime uses this list to
/// separate configuration flags from the host's launch arguments.
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--host",
    "--log-filter",
    "--log-format",
    "--log-dir",
];

/// Resolved plugin runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "STREAMDOCK")]
pub struct Config {
    /// Address of the host's WebSocket server.
    #[ortho_config(default = defaults::default_host())]
    pub host: String,
    /// `tracing` filter expression applied to plugin logs.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log lines.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Directory receiving `plugin.log`; empty disables the file sink.
    #[ortho_config(default = defaults::default_log_dir())]
    pub log_dir: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Loads configuration from an explicit argument list. The first element
    /// is the program name, as with `std::env::args_os`.
    pub fn load_from_iter<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Host address the plugin connects to.
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Log filter expression.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Directory for `plugin.log`, or `None` when file logging is disabled.
    pub fn log_dir(&self) -> Option<&Utf8Path> {
        if self.log_dir.as_str().is_empty() {
            None
        } else {
            Some(self.log_dir.as_path())
        }
    }

    /// WebSocket URL of the host for the given launch port.
    pub fn host_url(&self, port: u16) -> String {
        format!("ws://{}:{port}", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_url_combines_host_and_port() {
        let config = Config::default();
        assert_eq!(config.host_url(28196), "ws://127.0.0.1:28196");
    }

    #[test]
    fn default_log_dir_ends_in_logs() {
        let config = Config::default();
        let dir = config.log_dir().expect("file logging enabled by default");
        assert_eq!(dir.file_name(), Some(DEFAULT_LOG_DIR_NAME));
    }
}
