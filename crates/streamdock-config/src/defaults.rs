use std::env;

use camino::Utf8PathBuf;

/// Address the host's WebSocket server listens on.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default log filter expression used by the plugin executable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Directory name, relative to the executable, that receives `plugin.log`.
pub const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// Default host address.
pub fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

/// Default log filter expression.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the plugin executable.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Computes the default log directory: `logs/` next to the running
/// executable, or relative to the working directory when the executable
/// path cannot be represented as UTF-8.
pub fn default_log_dir() -> Utf8PathBuf {
    executable_directory()
        .map(|dir| dir.join(DEFAULT_LOG_DIR_NAME))
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LOG_DIR_NAME))
}

fn executable_directory() -> Option<Utf8PathBuf> {
    let executable = env::current_exe().ok()?;
    let parent = executable.parent()?.to_path_buf();
    Utf8PathBuf::from_path_buf(parent).ok()
}
