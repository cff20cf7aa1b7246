//! Runtime for the Stream Dock settings bridge plugin.
//!
//! [`run`] is everything the executable does: split configuration flags
//! from the host's launch arguments, load [`Config`], install telemetry,
//! connect to the host's WebSocket server and serve events until the host
//! closes the connection. The plugin logic itself lives in
//! `streamdock_plugin`; this crate only wires it to the outside world.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use streamdock_config::Config;
use streamdock_plugin::{ActionRegistry, MirrorBridge, Plugin};
use tracing::{error, info};

pub mod connection;
mod errors;
pub mod launch;
pub mod telemetry;

pub use connection::{HostChannel, WebSocketChannel, serve};
pub use errors::{ConnectionError, LaunchError, RuntimeError};
pub use launch::{ArgumentSplit, LaunchArgs, normalise_host_flags, split_arguments};
pub use telemetry::{TelemetryError, TelemetryHandle};

/// Tracing target for start-up and shutdown.
pub const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// Runs the plugin with the given process arguments, reporting failures on
/// `stderr`.
#[must_use]
pub fn run<I, E>(args: I, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
{
    match try_run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RuntimeError::Launch(LaunchError::Usage(usage))) if !usage.use_stderr() => {
            let _ = write!(stderr, "{usage}");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(target: RUNTIME_TARGET, error = %failure, "plugin stopped");
            let _ = writeln!(stderr, "{failure}");
            ExitCode::FAILURE
        }
    }
}

fn try_run<I>(args: I) -> Result<(), RuntimeError>
where
    I: IntoIterator<Item = OsString>,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_arguments(&args);
    let launch = LaunchArgs::parse_host_args(&split.launch_arguments)?;
    let config = Config::load_from_iter(split.config_arguments)
        .map_err(RuntimeError::LoadConfiguration)?;
    let telemetry = telemetry::initialise(&config)?;
    let host_info = launch.host_info();
    info!(
        target: RUNTIME_TARGET,
        plugin_uuid = launch.plugin_uuid.as_str(),
        plugin_version = host_info.plugin.version.as_str(),
        host_version = host_info.application.version.as_str(),
        platform = host_info.application.platform.as_str(),
        devices = host_info.devices.len(),
        log_file = telemetry.log_file().map(|path| path.as_str()),
        "plugin starting"
    );

    let registry = ActionRegistry::with_defaults(Arc::new(MirrorBridge));
    let mut plugin = Plugin::new(launch.plugin_uuid.as_str(), registry);
    let mut channel = WebSocketChannel::connect(&config.host_url(launch.port))?;
    serve(&mut plugin, &mut channel, &launch.register_event)?;
    info!(target: RUNTIME_TARGET, "plugin stopped");
    Ok(())
}
