//! Commands the plugin sends to the host.

use serde::Serialize;
use serde_json::Value;

use crate::error::PluginError;

/// Registration frame sent once the WebSocket connection is open.
///
/// The event name is chosen by the host at launch (`-registerEvent`), so it
/// is carried as data rather than as an [`OutboundCommand`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    event: String,
    uuid: String,
}

impl Registration {
    /// Creates a registration frame.
    #[must_use]
    pub fn new(event: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            uuid: uuid.into(),
        }
    }

    /// Serialises the frame.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::SerializeCommand`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, PluginError> {
        serde_json::to_string(self).map_err(PluginError::SerializeCommand)
    }
}

/// Commands understood by the host. Serialised with an `event` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum OutboundCommand {
    /// Sends a payload to the property inspector of one action instance.
    SendToPropertyInspector {
        /// Instance context.
        context: String,
        /// Action UUID of the instance.
        action: String,
        /// Application-defined message.
        payload: Value,
    },
    /// Persists settings for one action instance.
    SetSettings {
        /// Instance context.
        context: String,
        /// Settings object to store.
        payload: Value,
    },
    /// Asks the host to resend an instance's settings.
    GetSettings {
        /// Instance context.
        context: String,
    },
    /// Replaces the plugin-wide settings store.
    SetGlobalSettings {
        /// Plugin UUID.
        context: String,
        /// Settings object to store.
        payload: Value,
    },
    /// Asks the host to send `didReceiveGlobalSettings`.
    GetGlobalSettings {
        /// Plugin UUID.
        context: String,
    },
    /// Changes the title shown on a key.
    SetTitle {
        /// Instance context.
        context: String,
        /// Title details.
        payload: TitlePayload,
    },
    /// Switches a multi-state action to the given state.
    SetState {
        /// Instance context.
        context: String,
        /// Target state.
        payload: StatePayload,
    },
    /// Flashes a check mark on the key.
    ShowOk {
        /// Instance context.
        context: String,
    },
    /// Flashes a warning triangle on the key.
    ShowAlert {
        /// Instance context.
        context: String,
    },
    /// Writes a line into the host's own log.
    LogMessage {
        /// Message details.
        payload: MessagePayload,
    },
    /// Opens a URL in the default browser.
    OpenUrl {
        /// URL details.
        payload: UrlPayload,
    },
}

impl OutboundCommand {
    /// Builds a [`OutboundCommand::SendToPropertyInspector`].
    #[must_use]
    pub fn send_to_property_inspector(
        context: impl Into<String>,
        action: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self::SendToPropertyInspector {
            context: context.into(),
            action: action.into(),
            payload,
        }
    }

    /// Builds a [`OutboundCommand::SetGlobalSettings`].
    #[must_use]
    pub fn set_global_settings(plugin_uuid: impl Into<String>, payload: Value) -> Self {
        Self::SetGlobalSettings {
            context: plugin_uuid.into(),
            payload,
        }
    }

    /// Builds a [`OutboundCommand::GetGlobalSettings`].
    #[must_use]
    pub fn get_global_settings(plugin_uuid: impl Into<String>) -> Self {
        Self::GetGlobalSettings {
            context: plugin_uuid.into(),
        }
    }

    /// Builds a [`OutboundCommand::SetSettings`].
    #[must_use]
    pub fn set_settings(context: impl Into<String>, payload: Value) -> Self {
        Self::SetSettings {
            context: context.into(),
            payload,
        }
    }

    /// Builds a [`OutboundCommand::GetSettings`].
    #[must_use]
    pub fn get_settings(context: impl Into<String>) -> Self {
        Self::GetSettings {
            context: context.into(),
        }
    }

    /// Builds a [`OutboundCommand::SetTitle`] targeting hardware and software.
    #[must_use]
    pub fn set_title(context: impl Into<String>, title: impl Into<String>) -> Self {
        Self::SetTitle {
            context: context.into(),
            payload: TitlePayload {
                title: title.into(),
                target: 0,
                state: None,
            },
        }
    }

    /// Builds a [`OutboundCommand::LogMessage`].
    #[must_use]
    pub fn log_message(message: impl Into<String>) -> Self {
        Self::LogMessage {
            payload: MessagePayload {
                message: message.into(),
            },
        }
    }

    /// Host event name of the command.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::SendToPropertyInspector { .. } => "sendToPropertyInspector",
            Self::SetSettings { .. } => "setSettings",
            Self::GetSettings { .. } => "getSettings",
            Self::SetGlobalSettings { .. } => "setGlobalSettings",
            Self::GetGlobalSettings { .. } => "getGlobalSettings",
            Self::SetTitle { .. } => "setTitle",
            Self::SetState { .. } => "setState",
            Self::ShowOk { .. } => "showOk",
            Self::ShowAlert { .. } => "showAlert",
            Self::LogMessage { .. } => "logMessage",
            Self::OpenUrl { .. } => "openUrl",
        }
    }

    /// Serialises the command to the host's JSON shape.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::SerializeCommand`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, PluginError> {
        serde_json::to_string(self).map_err(PluginError::SerializeCommand)
    }
}

/// Payload of [`OutboundCommand::SetTitle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitlePayload {
    /// New title text.
    pub title: String,
    /// 0 for hardware and software, 1 for hardware only, 2 for software only.
    #[serde(default)]
    pub target: u8,
    /// State the title applies to; all states when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
}

/// Payload of [`OutboundCommand::SetState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatePayload {
    /// Zero-based state index.
    pub state: u8,
}

/// Payload of [`OutboundCommand::LogMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    /// Text to log.
    pub message: String,
}

/// Payload of [`OutboundCommand::OpenUrl`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlPayload {
    /// URL to open.
    pub url: String,
}
