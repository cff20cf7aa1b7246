//! Settings synchronisation between the host, the property inspector, and
//! the global settings store.
//!
//! The bridge is the one piece of application behaviour in the plugin: when
//! the host delivers settings for an instance, the bridge folds them into
//! the instance's local mirror and relays a status message to the property
//! inspector plus an update to the global store. The other two hooks only
//! observe. Implementations are injected into
//! [`SettingsAction`](crate::action::SettingsAction) through the registry.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::protocol::OutboundCommand;
use crate::settings::SettingsRecord;
use crate::sink::HostSink;

/// Tracing target for bridge activity.
pub const BRIDGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bridge");

/// Key written into local settings on every settings notification.
pub const DIAGNOSTIC_KEY: &str = "bridge";

/// Value stored under [`DIAGNOSTIC_KEY`].
pub const DIAGNOSTIC_VALUE: &str = "synced";

/// Status reported to the property inspector after a settings update.
pub const STATUS_SETTINGS_RECEIVED: &str = "settingsReceived";

/// Identifies where relayed messages go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTarget<'a> {
    /// Plugin UUID, used as the context of global settings commands.
    pub plugin_uuid: &'a str,
    /// Context of the action instance.
    pub context: &'a str,
    /// Action UUID of the instance.
    pub action: &'a str,
}

/// Hooks invoked for settings traffic of one action instance.
///
/// Implementations must not panic; faults are logged. The observing hooks
/// receive the local settings by shared reference and so cannot change them.
pub trait SettingsBridge {
    /// Handles `didReceiveSettings`: merge `payload` into `local`, then relay.
    fn on_receive_settings(
        &self,
        target: &RelayTarget<'_>,
        local: &mut SettingsRecord,
        payload: &Value,
        sink: &mut dyn HostSink,
    );

    /// Handles a payload sent by the property inspector.
    fn on_send_to_property_inspector(
        &self,
        target: &RelayTarget<'_>,
        local: &SettingsRecord,
        payload: &Value,
    );

    /// Handles `didReceiveGlobalSettings` with the full global mapping.
    fn on_receive_global_settings(
        &self,
        target: &RelayTarget<'_>,
        local: &SettingsRecord,
        payload: &Value,
    );
}

/// Default bridge: merges, stamps the diagnostic field, and mirrors the
/// merged settings to the inspector and the global store.
#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorBridge;

impl MirrorBridge {
    /// Builds the bridge.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Message sent to the property inspector after a merge.
    #[must_use]
    pub fn inspector_status(local: &SettingsRecord) -> Value {
        json!({
            "status": STATUS_SETTINGS_RECEIVED,
            "settings": local.to_value(),
        })
    }

    /// Payload written to the global settings store after a merge.
    #[must_use]
    pub fn global_update(target: &RelayTarget<'_>, local: &SettingsRecord) -> Value {
        json!({
            "lastContext": target.context,
            "lastSettings": local.to_value(),
        })
    }
}

impl SettingsBridge for MirrorBridge {
    fn on_receive_settings(
        &self,
        target: &RelayTarget<'_>,
        local: &mut SettingsRecord,
        payload: &Value,
        sink: &mut dyn HostSink,
    ) {
        if local.merge(payload).is_ignored() {
            warn!(
                target: BRIDGE_TARGET,
                context = target.context,
                payload = %payload,
                "settings payload is not an object; keeping previous settings"
            );
        }
        local.insert(DIAGNOSTIC_KEY, Value::from(DIAGNOSTIC_VALUE));
        debug!(
            target: BRIDGE_TARGET,
            context = target.context,
            keys = local.len(),
            "local settings updated"
        );

        relay(
            sink,
            OutboundCommand::send_to_property_inspector(
                target.context,
                target.action,
                Self::inspector_status(local),
            ),
        );
        relay(
            sink,
            OutboundCommand::set_global_settings(
                target.plugin_uuid,
                Self::global_update(target, local),
            ),
        );
    }

    fn on_send_to_property_inspector(
        &self,
        target: &RelayTarget<'_>,
        _local: &SettingsRecord,
        payload: &Value,
    ) {
        info!(
            target: BRIDGE_TARGET,
            context = target.context,
            payload = %payload,
            "property inspector message received"
        );
    }

    fn on_receive_global_settings(
        &self,
        target: &RelayTarget<'_>,
        _local: &SettingsRecord,
        payload: &Value,
    ) {
        info!(
            target: BRIDGE_TARGET,
            context = target.context,
            settings = %payload,
            "global settings received"
        );
    }
}

fn relay(sink: &mut dyn HostSink, command: OutboundCommand) {
    let event = command.event_name();
    if let Err(error) = sink.send(command) {
        warn!(
            target: BRIDGE_TARGET,
            event,
            error = %error,
            "failed to relay settings"
        );
    }
}
