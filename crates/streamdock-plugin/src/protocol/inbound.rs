//! Events delivered by the host over the WebSocket connection.

use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::error::PluginError;

static NULL: Value = Value::Null;

/// Event names the plugin understands.
///
/// The host identifies events by a camel-case `event` field; names not listed
/// here still decode, with [`InboundEvent::kind`] returning `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum EventKind {
    /// Settings for one action instance changed.
    DidReceiveSettings,
    /// The plugin-wide settings store changed or was requested.
    DidReceiveGlobalSettings,
    /// The property inspector sent a payload to its action instance.
    SendToPlugin,
    /// Property inspector traffic relayed back to the plugin by some hosts.
    SendToPropertyInspector,
    /// An action instance became visible.
    WillAppear,
    /// An action instance is being torn down.
    WillDisappear,
    /// The title or its styling changed.
    TitleParametersDidChange,
    /// A key was pressed.
    KeyDown,
    /// A key was released.
    KeyUp,
    /// A dial was pressed.
    DialDown,
    /// A dial was released.
    DialUp,
    /// A dial was rotated.
    DialRotate,
    /// A device was plugged in.
    DeviceDidConnect,
    /// A device was unplugged.
    DeviceDidDisconnect,
    /// A monitored application launched.
    ApplicationDidLaunch,
    /// A monitored application exited.
    ApplicationDidTerminate,
    /// The computer woke up.
    SystemDidWakeUp,
    /// The property inspector for an instance was shown.
    PropertyInspectorDidAppear,
    /// The property inspector for an instance was hidden.
    PropertyInspectorDidDisappear,
}

/// How the dispatcher routes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Routed to the single instance named by the event's context.
    Context,
    /// Delivered to every live instance.
    Broadcast,
}

impl EventKind {
    /// Routing scope of the event.
    #[must_use]
    pub const fn scope(self) -> EventScope {
        match self {
            Self::DidReceiveGlobalSettings
            | Self::DeviceDidConnect
            | Self::DeviceDidDisconnect
            | Self::ApplicationDidLaunch
            | Self::ApplicationDidTerminate
            | Self::SystemDidWakeUp => EventScope::Broadcast,
            Self::DidReceiveSettings
            | Self::SendToPlugin
            | Self::SendToPropertyInspector
            | Self::WillAppear
            | Self::WillDisappear
            | Self::TitleParametersDidChange
            | Self::KeyDown
            | Self::KeyUp
            | Self::DialDown
            | Self::DialUp
            | Self::DialRotate
            | Self::PropertyInspectorDidAppear
            | Self::PropertyInspectorDidDisappear => EventScope::Context,
        }
    }
}

/// A decoded host event.
///
/// The frame is kept as JSON so fields the plugin does not model survive
/// untouched; accessors read the common fields leniently and never fail.
///
/// # Example
///
/// ```
/// use streamdock_plugin::protocol::{EventKind, InboundEvent};
///
/// let event = InboundEvent::decode(
///     r#"{"event":"keyDown","context":"ctx-1","payload":{"state":0}}"#,
/// )
/// .unwrap();
/// assert_eq!(event.kind(), Some(EventKind::KeyDown));
/// assert_eq!(event.context(), Some("ctx-1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    name: String,
    kind: Option<EventKind>,
    raw: Value,
}

impl InboundEvent {
    /// Creates an event of the given kind with no other fields.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        let mut raw = Map::new();
        raw.insert("event".into(), Value::String(kind.as_ref().to_owned()));
        Self {
            name: kind.as_ref().to_owned(),
            kind: Some(kind),
            raw: Value::Object(raw),
        }
    }

    /// Decodes a text frame received from the host.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MalformedEvent`] when the frame is not JSON,
    /// not an object, or lacks a string `event` field.
    pub fn decode(text: &str) -> Result<Self, PluginError> {
        let raw: Value =
            serde_json::from_str(text).map_err(|source| PluginError::MalformedEvent {
                message: "frame is not valid JSON".to_owned(),
                source: Some(source),
            })?;
        Self::from_value(raw)
    }

    /// Builds an event from an already parsed frame.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MalformedEvent`] when the frame is not an object
    /// or lacks a string `event` field.
    pub fn from_value(raw: Value) -> Result<Self, PluginError> {
        if !raw.is_object() {
            return Err(PluginError::malformed("frame is not a JSON object"));
        }
        let name = raw
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::malformed("frame has no string 'event' field"))?
            .to_owned();
        let kind = name.parse::<EventKind>().ok();
        Ok(Self { name, kind, raw })
    }

    /// Sets the context field.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        self.with_field("context", Value::String(context.into()))
    }

    /// Sets the action UUID field.
    #[must_use]
    pub fn with_action(self, action: impl Into<String>) -> Self {
        self.with_field("action", Value::String(action.into()))
    }

    /// Sets the device field.
    #[must_use]
    pub fn with_device(self, device: impl Into<String>) -> Self {
        self.with_field("device", Value::String(device.into()))
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(self, payload: Value) -> Self {
        self.with_field("payload", payload)
    }

    fn with_field(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.raw {
            map.insert(key.to_owned(), value);
        }
        self
    }

    /// Event name as sent by the host.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Recognised event kind, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    /// Context identifying the action instance, when present.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.str_field("context")
    }

    /// Full action UUID, when present.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.str_field("action")
    }

    /// Device identifier, when present.
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        self.str_field("device")
    }

    /// The `payload` field, or `null` when absent.
    #[must_use]
    pub fn payload(&self) -> &Value {
        self.raw.get("payload").unwrap_or(&NULL)
    }

    /// The `payload.settings` object, or an empty object when absent or
    /// malformed.
    #[must_use]
    pub fn settings(&self) -> Value {
        match self.payload().get("settings") {
            Some(settings @ Value::Object(_)) => settings.clone(),
            _ => Value::Object(Map::new()),
        }
    }

    /// Returns `true` when `payload.settings` exists but is not an object.
    #[must_use]
    pub fn has_malformed_settings(&self) -> bool {
        self.payload()
            .get("settings")
            .is_some_and(|settings| !settings.is_object())
    }

    /// The complete frame.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }
}
