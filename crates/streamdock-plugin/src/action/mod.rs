//! Action instances: one per key or dial the user placed on a device.
//!
//! The host identifies each placed action by a *context*. The dispatcher
//! creates an [`Action`] when the host reports `willAppear` for a new
//! context and drops it on `willDisappear`. Every handler has a no-op
//! default so implementations override only the events they care about.

use serde_json::Value;
use tracing::warn;

use crate::protocol::InboundEvent;
use crate::settings::SettingsRecord;
use crate::sink::HostHandle;

mod builtin;

pub use builtin::{SettingsAction, TestAction};

/// Tracing target for action handlers.
pub const ACTION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::action");

/// Returns the registry name of an action UUID: its last dot-separated
/// segment (`com.tunl.volume.settings` becomes `settings`).
///
/// # Example
///
/// ```
/// use streamdock_plugin::action::action_name;
///
/// assert_eq!(action_name("com.tunl.volume.settings"), "settings");
/// assert_eq!(action_name("plain"), "plain");
/// ```
#[must_use]
pub fn action_name(action_uuid: &str) -> &str {
    action_uuid.rsplit('.').next().unwrap_or(action_uuid)
}

/// Who an action instance is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionIdentity {
    action: String,
    context: String,
    device: Option<String>,
}

impl ActionIdentity {
    /// Creates an identity from the action UUID and instance context.
    #[must_use]
    pub fn new(action: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            context: context.into(),
            device: None,
        }
    }

    /// Records the device the instance lives on.
    #[must_use]
    pub fn with_device(mut self, device: Option<&str>) -> Self {
        self.device = device.map(str::to_owned);
        self
    }

    /// Full action UUID.
    #[must_use]
    pub const fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Instance context.
    #[must_use]
    pub const fn context(&self) -> &str {
        self.context.as_str()
    }

    /// Device identifier, when the host supplied one.
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Registry name derived from the action UUID.
    #[must_use]
    pub fn name(&self) -> &str {
        action_name(&self.action)
    }
}

/// Behaviour of one placed action.
///
/// Context-scoped handlers receive the event that triggered them; broadcast
/// handlers (device, application, wake-up) are delivered to every instance.
/// `host` sends commands back; its sends are queued and flushed by the
/// runtime after the handler returns.
pub trait Action {
    /// Identity of this instance.
    fn identity(&self) -> &ActionIdentity;

    /// Local settings mirror.
    fn settings(&self) -> &SettingsRecord;

    /// Mutable local settings mirror.
    fn settings_mut(&mut self) -> &mut SettingsRecord;

    /// The instance became visible.
    fn on_will_appear(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// The instance is about to be removed.
    fn on_will_disappear(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// The host delivered this instance's settings. The default merges them
    /// into the local mirror.
    fn on_did_receive_settings(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        if event.has_malformed_settings() {
            warn!(
                target: ACTION_TARGET,
                context = self.identity().context(),
                "ignoring settings that are not an object"
            );
        }
        self.settings_mut().merge(&event.settings());
    }

    /// The plugin-wide settings changed.
    fn on_did_receive_global_settings(
        &mut self,
        _global: &SettingsRecord,
        _host: &mut HostHandle<'_>,
    ) {
    }

    /// The title or its styling changed.
    fn on_title_parameters_did_change(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {
    }

    /// A key was pressed.
    fn on_key_down(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A key was released.
    fn on_key_up(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A dial was pressed.
    fn on_dial_down(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A dial was released.
    fn on_dial_up(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A dial was rotated.
    fn on_dial_rotate(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A device was connected.
    fn on_device_did_connect(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A device was disconnected.
    fn on_device_did_disconnect(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A monitored application launched.
    fn on_application_did_launch(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// A monitored application terminated.
    fn on_application_did_terminate(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {
    }

    /// The computer woke from sleep.
    fn on_system_did_wake_up(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {}

    /// The property inspector for this instance appeared.
    fn on_property_inspector_did_appear(
        &mut self,
        _event: &InboundEvent,
        _host: &mut HostHandle<'_>,
    ) {
    }

    /// The property inspector for this instance disappeared.
    fn on_property_inspector_did_disappear(
        &mut self,
        _event: &InboundEvent,
        _host: &mut HostHandle<'_>,
    ) {
    }

    /// The property inspector sent a payload to this instance.
    fn on_send_to_plugin(&mut self, _payload: &Value, _host: &mut HostHandle<'_>) {}
}
