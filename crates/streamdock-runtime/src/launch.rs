//! Launch argument handling.
//!
//! The host starts the plugin as
//! `<exe> -port <n> -pluginUUID <uuid> -registerEvent <event> -info <json>`.
//! Those single-dash flags are rewritten to `--` form before `clap` parses
//! them. Configuration flags understood by `ortho_config` may be mixed in
//! and are split off first so each parser sees only its own flags.

use std::ffi::{OsStr, OsString};

use clap::Parser;
use streamdock_config::CONFIG_CLI_FLAGS;
use streamdock_plugin::HostInfo;

use crate::errors::LaunchError;

/// Flag names the host passes with a single dash.
const HOST_FLAGS: &[&str] = &["port", "pluginUUID", "registerEvent", "info"];

/// Arguments supplied by the host when it starts the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "streamdock-bridge", about = "Stream Dock settings bridge plugin")]
pub struct LaunchArgs {
    /// Port of the host's WebSocket server.
    #[arg(long)]
    pub port: u16,
    /// UUID identifying this plugin to the host.
    #[arg(long = "pluginUUID")]
    pub plugin_uuid: String,
    /// Event name used to register with the host.
    #[arg(long = "registerEvent")]
    pub register_event: String,
    /// JSON description of the host and attached devices.
    #[arg(long)]
    pub info: String,
}

impl LaunchArgs {
    /// Parses launch arguments in the host's single-dash form.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Usage`] when a flag is missing or invalid.
    pub fn parse_host_args(args: &[OsString]) -> Result<Self, LaunchError> {
        Self::try_parse_from(normalise_host_flags(args)).map_err(LaunchError::Usage)
    }

    /// Decodes the `-info` argument. A description that does not match the
    /// expected shape is logged and replaced by defaults.
    #[must_use]
    pub fn host_info(&self) -> HostInfo {
        HostInfo::parse_lenient(&self.info)
    }
}

/// Rewrites `-port` style host flags to `--port`; other arguments pass
/// through unchanged.
#[must_use]
pub fn normalise_host_flags(args: &[OsString]) -> Vec<OsString> {
    args.iter()
        .map(|argument| {
            let text = argument.to_string_lossy();
            match text.strip_prefix('-') {
                Some(name) if !name.starts_with('-') && HOST_FLAGS.contains(&name) => {
                    OsString::from(format!("--{name}"))
                }
                _ => argument.clone(),
            }
        })
        .collect()
}

/// Process arguments separated into the configuration loader's share and
/// the host's launch arguments. Both keep the program name first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSplit {
    /// Arguments for `ortho_config`.
    pub config_arguments: Vec<OsString>,
    /// Arguments for [`LaunchArgs`].
    pub launch_arguments: Vec<OsString>,
}

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let mut flag_parts = argument_text.splitn(2, '=');
    let flag = flag_parts.next().unwrap_or_default();
    let has_inline_value = flag_parts.next().is_some();

    if CONFIG_CLI_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !has_inline_value,
        };
    }

    FlagAction::Skip
}

/// Splits configuration flags from launch arguments. Configuration flags
/// may appear anywhere; their values are taken from the next argument
/// unless written as `--flag=value`.
#[must_use]
pub fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let mut remaining = args.iter();
    let program: Vec<OsString> = remaining.next().cloned().into_iter().collect();
    let mut config_arguments = program.clone();
    let mut launch_arguments = program;

    while let Some(argument) = remaining.next() {
        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Skip => launch_arguments.push(argument.clone()),
        }
    }

    ArgumentSplit {
        config_arguments,
        launch_arguments,
    }
}
