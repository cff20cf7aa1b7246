//! Domain errors raised while decoding host events and dispatching them.
//!
//! Dispatch itself never fails towards the host: handlers log these errors
//! and carry on. The enum exists so decoding and registry operations can
//! report structured context to the caller that chooses to log them.

use thiserror::Error;

/// Errors arising from plugin protocol and dispatch operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A host frame could not be decoded into an event.
    #[error("malformed host event: {message}")]
    MalformedEvent {
        /// Human-readable description of the decode failure.
        message: String,
        /// Optional underlying JSON error.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// An outbound command could not be serialised to JSON.
    #[error("failed to serialise outbound command: {0}")]
    SerializeCommand(#[source] serde_json::Error),

    /// No factory is registered for the requested action.
    #[error("action type '{name}' is not registered (requested by '{action}')")]
    UnknownAction {
        /// Trailing action name that was looked up.
        name: String,
        /// Full action UUID supplied by the host.
        action: String,
    },

    /// A factory with the same action name is already registered.
    #[error("action type '{name}' is already registered")]
    DuplicateAction {
        /// Action name that was registered twice.
        name: String,
    },

    /// A context-scoped event arrived without a context.
    #[error("event '{event}' requires a context but none was supplied")]
    MissingContext {
        /// Host event name.
        event: String,
    },

    /// The outbound channel refused the command.
    #[error("outbound channel rejected '{event}': {message}")]
    Outbound {
        /// Host event name of the rejected command.
        event: String,
        /// Description of the failure.
        message: String,
    },

    /// An action handler panicked while processing an event.
    #[error("handler for '{event}' panicked in context '{context}'")]
    HandlerPanicked {
        /// Host event name being handled.
        event: String,
        /// Context of the action instance.
        context: String,
    },
}

impl PluginError {
    /// Builds a [`PluginError::MalformedEvent`] without an underlying source.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
            source: None,
        }
    }
}
