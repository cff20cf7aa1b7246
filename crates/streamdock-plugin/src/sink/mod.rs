//! Outbound channel abstraction.
//!
//! Handlers never talk to the socket directly. They hand commands to a
//! [`HostSink`]; the runtime supplies an [`OutboundQueue`] during dispatch and
//! flushes it to the WebSocket once the handler has returned, which keeps the
//! event loop single-threaded and free of shared borrows.

use serde_json::Value;

use crate::action::ActionIdentity;
use crate::error::PluginError;
use crate::protocol::{OutboundCommand, StatePayload, UrlPayload};

/// Destination for commands bound to the host.
///
/// Delivery is fire-and-forget: an `Ok` means the command was accepted for
/// sending, not that the host acted on it.
pub trait HostSink {
    /// Accepts a command for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Outbound`] when the channel cannot take the
    /// command.
    fn send(&mut self, command: OutboundCommand) -> Result<(), PluginError>;
}

/// In-memory sink that preserves command order.
///
/// # Example
///
/// ```
/// use streamdock_plugin::{HostSink, OutboundCommand, OutboundQueue};
///
/// let mut queue = OutboundQueue::new();
/// queue.send(OutboundCommand::get_global_settings("uuid")).unwrap();
/// assert_eq!(queue.len(), 1);
/// let drained: Vec<_> = queue.drain().collect();
/// assert_eq!(drained.len(), 1);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundQueue {
    commands: Vec<OutboundCommand>,
}

impl OutboundQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands queued so far.
    #[must_use]
    pub fn commands(&self) -> &[OutboundCommand] {
        &self.commands
    }

    /// Removes and yields every queued command in send order.
    pub fn drain(&mut self) -> impl Iterator<Item = OutboundCommand> + '_ {
        self.commands.drain(..)
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Counts queued commands with the given host event name.
    #[must_use]
    pub fn count_of(&self, event_name: &str) -> usize {
        self.commands
            .iter()
            .filter(|command| command.event_name() == event_name)
            .count()
    }
}

impl HostSink for OutboundQueue {
    fn send(&mut self, command: OutboundCommand) -> Result<(), PluginError> {
        self.commands.push(command);
        Ok(())
    }
}

/// Handle given to action handlers for talking back to the host.
///
/// Wraps the dispatcher's sink together with the plugin UUID so helpers can
/// fill in the context of plugin-scoped commands.
pub struct HostHandle<'a> {
    plugin_uuid: &'a str,
    sink: &'a mut dyn HostSink,
}

impl<'a> HostHandle<'a> {
    /// Wraps `sink` for the plugin identified by `plugin_uuid`.
    #[must_use]
    pub const fn new(plugin_uuid: &'a str, sink: &'a mut dyn HostSink) -> Self {
        Self { plugin_uuid, sink }
    }

    /// UUID the plugin registered with.
    #[must_use]
    pub const fn plugin_uuid(&self) -> &'a str {
        self.plugin_uuid
    }

    /// Replaces the plugin-wide settings.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn set_global_settings(&mut self, payload: Value) -> Result<(), PluginError> {
        self.sink
            .send(OutboundCommand::set_global_settings(self.plugin_uuid, payload))
    }

    /// Asks the host for the plugin-wide settings.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn request_global_settings(&mut self) -> Result<(), PluginError> {
        self.sink
            .send(OutboundCommand::get_global_settings(self.plugin_uuid))
    }

    /// Persists settings for `identity` in the host.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn set_settings(
        &mut self,
        identity: &ActionIdentity,
        payload: Value,
    ) -> Result<(), PluginError> {
        self.sink
            .send(OutboundCommand::set_settings(identity.context(), payload))
    }

    /// Asks the host to resend the settings of `identity`, which arrive as
    /// `didReceiveSettings`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn request_settings(&mut self, identity: &ActionIdentity) -> Result<(), PluginError> {
        self.sink
            .send(OutboundCommand::get_settings(identity.context()))
    }

    /// Sends `payload` to the property inspector of `identity`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn send_to_property_inspector(
        &mut self,
        identity: &ActionIdentity,
        payload: Value,
    ) -> Result<(), PluginError> {
        self.sink.send(OutboundCommand::send_to_property_inspector(
            identity.context(),
            identity.action(),
            payload,
        ))
    }

    /// Sets the title of `identity`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn set_title(
        &mut self,
        identity: &ActionIdentity,
        title: impl Into<String>,
    ) -> Result<(), PluginError> {
        self.sink
            .send(OutboundCommand::set_title(identity.context(), title))
    }

    /// Switches `identity` to `state`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn set_state(&mut self, identity: &ActionIdentity, state: u8) -> Result<(), PluginError> {
        self.sink.send(OutboundCommand::SetState {
            context: identity.context().to_owned(),
            payload: StatePayload { state },
        })
    }

    /// Flashes a check mark on `identity`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn show_ok(&mut self, identity: &ActionIdentity) -> Result<(), PluginError> {
        self.sink.send(OutboundCommand::ShowOk {
            context: identity.context().to_owned(),
        })
    }

    /// Flashes a warning on `identity`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn show_alert(&mut self, identity: &ActionIdentity) -> Result<(), PluginError> {
        self.sink.send(OutboundCommand::ShowAlert {
            context: identity.context().to_owned(),
        })
    }

    /// Writes `message` into the host log.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn log_message(&mut self, message: impl Into<String>) -> Result<(), PluginError> {
        self.sink.send(OutboundCommand::log_message(message))
    }

    /// Opens `url` in the user's browser.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn open_url(&mut self, url: impl Into<String>) -> Result<(), PluginError> {
        self.sink.send(OutboundCommand::OpenUrl {
            payload: UrlPayload { url: url.into() },
        })
    }
}

impl std::fmt::Debug for HostHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("plugin_uuid", &self.plugin_uuid)
            .finish_non_exhaustive()
    }
}

impl HostSink for HostHandle<'_> {
    fn send(&mut self, command: OutboundCommand) -> Result<(), PluginError> {
        self.sink.send(command)
    }
}
