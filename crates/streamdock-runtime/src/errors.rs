//! Error types for the plugin executable.

use std::sync::Arc;

use thiserror::Error;

use streamdock_plugin::PluginError;

use crate::telemetry::TelemetryError;

/// Errors raised while interpreting the host's launch arguments.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The arguments did not match the expected launch flags.
    #[error("{0}")]
    Usage(#[source] clap::Error),
}

/// Errors raised on the host connection.
///
/// `tungstenite` errors are boxed to keep the enum small.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The WebSocket handshake with the host failed.
    #[error("failed to connect to host at {url}: {source}")]
    Connect {
        /// Host URL that was dialled.
        url: String,
        /// Underlying WebSocket error.
        #[source]
        source: Box<tungstenite::Error>,
    },
    /// Reading a frame failed.
    #[error("failed to read from host: {0}")]
    Receive(#[source] Box<tungstenite::Error>),
    /// Writing a frame failed.
    #[error("failed to send to host: {0}")]
    Send(#[source] Box<tungstenite::Error>),
    /// A frame could not be encoded.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] PluginError),
}

/// Top-level failure of a plugin run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Launch arguments were invalid.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// Logging could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The host connection failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
