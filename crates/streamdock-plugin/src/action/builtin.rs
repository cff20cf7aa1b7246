//! Actions shipped with the plugin.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use super::{ACTION_TARGET, Action, ActionIdentity};
use crate::bridge::{RelayTarget, SettingsBridge};
use crate::protocol::InboundEvent;
use crate::settings::SettingsRecord;
use crate::sink::HostHandle;

/// Action whose settings traffic is handled by a [`SettingsBridge`].
pub struct SettingsAction {
    identity: ActionIdentity,
    settings: SettingsRecord,
    bridge: Arc<dyn SettingsBridge>,
}

impl SettingsAction {
    /// Registry name of the action.
    pub const NAME: &'static str = "settings";

    /// Creates an instance seeded with the settings delivered at appearance.
    #[must_use]
    pub fn new(
        identity: ActionIdentity,
        settings: SettingsRecord,
        bridge: Arc<dyn SettingsBridge>,
    ) -> Self {
        Self {
            identity,
            settings,
            bridge,
        }
    }
}

impl std::fmt::Debug for SettingsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsAction")
            .field("identity", &self.identity)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Action for SettingsAction {
    fn identity(&self) -> &ActionIdentity {
        &self.identity
    }

    fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SettingsRecord {
        &mut self.settings
    }

    fn on_did_receive_settings(&mut self, event: &InboundEvent, host: &mut HostHandle<'_>) {
        let payload = event
            .payload()
            .get("settings")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let target = RelayTarget {
            plugin_uuid: host.plugin_uuid(),
            context: self.identity.context(),
            action: self.identity.action(),
        };
        self.bridge
            .on_receive_settings(&target, &mut self.settings, &payload, host);
    }

    fn on_did_receive_global_settings(
        &mut self,
        global: &SettingsRecord,
        host: &mut HostHandle<'_>,
    ) {
        let target = RelayTarget {
            plugin_uuid: host.plugin_uuid(),
            context: self.identity.context(),
            action: self.identity.action(),
        };
        self.bridge
            .on_receive_global_settings(&target, &self.settings, &global.to_value());
    }

    fn on_send_to_plugin(&mut self, payload: &Value, host: &mut HostHandle<'_>) {
        let target = RelayTarget {
            plugin_uuid: host.plugin_uuid(),
            context: self.identity.context(),
            action: self.identity.action(),
        };
        self.bridge
            .on_send_to_property_inspector(&target, &self.settings, payload);
    }
}

/// Diagnostic action that logs every event it receives.
#[derive(Debug)]
pub struct TestAction {
    identity: ActionIdentity,
    settings: SettingsRecord,
}

impl TestAction {
    /// Registry name of the action.
    pub const NAME: &'static str = "test";

    /// Creates an instance.
    #[must_use]
    pub fn new(identity: ActionIdentity, settings: SettingsRecord) -> Self {
        info!(
            target: ACTION_TARGET,
            context = identity.context(),
            "test action created"
        );
        Self { identity, settings }
    }

    fn trace(&self, handler: &str, payload: &Value) {
        info!(
            target: ACTION_TARGET,
            context = self.identity.context(),
            handler,
            payload = %payload,
            "test action event"
        );
    }
}

impl Action for TestAction {
    fn identity(&self) -> &ActionIdentity {
        &self.identity
    }

    fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SettingsRecord {
        &mut self.settings
    }

    fn on_will_appear(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_will_appear", event.payload());
    }

    fn on_will_disappear(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_will_disappear", event.payload());
    }

    fn on_did_receive_settings(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_did_receive_settings", event.payload());
        self.settings.merge(&event.settings());
    }

    fn on_did_receive_global_settings(
        &mut self,
        global: &SettingsRecord,
        _host: &mut HostHandle<'_>,
    ) {
        self.trace("on_did_receive_global_settings", &global.to_value());
    }

    fn on_title_parameters_did_change(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_title_parameters_did_change", event.payload());
    }

    fn on_key_down(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_key_down", event.payload());
    }

    fn on_key_up(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_key_up", event.payload());
    }

    fn on_device_did_connect(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_device_did_connect", event.raw());
    }

    fn on_device_did_disconnect(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_device_did_disconnect", event.raw());
    }

    fn on_application_did_launch(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_application_did_launch", event.raw());
    }

    fn on_application_did_terminate(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_application_did_terminate", event.raw());
    }

    fn on_system_did_wake_up(&mut self, event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.trace("on_system_did_wake_up", event.raw());
    }

    fn on_property_inspector_did_appear(
        &mut self,
        event: &InboundEvent,
        _host: &mut HostHandle<'_>,
    ) {
        self.trace("on_property_inspector_did_appear", event.raw());
    }

    fn on_property_inspector_did_disappear(
        &mut self,
        event: &InboundEvent,
        _host: &mut HostHandle<'_>,
    ) {
        self.trace("on_property_inspector_did_disappear", event.raw());
    }

    fn on_send_to_plugin(&mut self, payload: &Value, _host: &mut HostHandle<'_>) {
        self.trace("on_send_to_plugin", payload);
    }
}
