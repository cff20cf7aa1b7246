//! Event dispatcher owning every live action instance.
//!
//! [`Plugin`] is the single point where decoded host events meet action
//! code. It creates and tears down instances as the host reports them,
//! routes context-scoped events to one instance and broadcasts the rest.
//! Faults never escape: decode failures are returned to the caller for
//! logging, while unknown events, missing instances and panicking handlers
//! are logged here and skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::action::{Action, ActionIdentity};
use crate::error::PluginError;
use crate::protocol::{EventKind, EventScope, InboundEvent, OutboundCommand, Registration};
use crate::registry::ActionRegistry;
use crate::settings::SettingsRecord;
use crate::sink::{HostHandle, HostSink};

/// Tracing target for dispatch decisions.
pub const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Plugin state: registered factories, live instances, and the last known
/// global settings.
pub struct Plugin {
    uuid: String,
    registry: ActionRegistry,
    instances: BTreeMap<String, Box<dyn Action>>,
    global_settings: SettingsRecord,
}

impl Plugin {
    /// Creates a plugin that registered with `uuid`.
    #[must_use]
    pub fn new(uuid: impl Into<String>, registry: ActionRegistry) -> Self {
        Self {
            uuid: uuid.into(),
            registry,
            instances: BTreeMap::new(),
            global_settings: SettingsRecord::new(),
        }
    }

    /// Plugin UUID.
    #[must_use]
    pub const fn uuid(&self) -> &str {
        self.uuid.as_str()
    }

    /// Registration frame announcing this plugin to the host.
    #[must_use]
    pub fn registration(&self, register_event: &str) -> Registration {
        Registration::new(register_event, self.uuid.as_str())
    }

    /// Decodes one text frame and dispatches it.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MalformedEvent`] when the frame cannot be
    /// decoded. Dispatch itself never fails.
    pub fn handle_frame(&mut self, frame: &str, sink: &mut dyn HostSink) -> Result<(), PluginError> {
        let event = InboundEvent::decode(frame)?;
        self.dispatch(&event, sink);
        Ok(())
    }

    /// Routes `event` to the instances it concerns.
    pub fn dispatch(&mut self, event: &InboundEvent, sink: &mut dyn HostSink) {
        let Some(kind) = event.kind() else {
            warn!(
                target: DISPATCH_TARGET,
                event = event.name(),
                "no handler for event"
            );
            return;
        };
        debug!(
            target: DISPATCH_TARGET,
            event = event.name(),
            context = event.context().unwrap_or_default(),
            "dispatching event"
        );

        match kind {
            EventKind::WillAppear => {
                self.create_instance(event);
                self.route(kind, event, sink);
            }
            EventKind::WillDisappear => {
                self.route(kind, event, sink);
                self.remove_instance(event);
            }
            EventKind::DidReceiveGlobalSettings => {
                self.global_settings.replace(&event.settings());
                self.broadcast(kind, event, sink);
            }
            _ => match kind.scope() {
                EventScope::Context => self.route(kind, event, sink),
                EventScope::Broadcast => self.broadcast(kind, event, sink),
            },
        }
    }

    /// Replaces the plugin-wide settings in the host and in the local mirror.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error; the mirror is left untouched on failure.
    pub fn set_global_settings(
        &mut self,
        payload: &Value,
        sink: &mut dyn HostSink,
    ) -> Result<(), PluginError> {
        sink.send(OutboundCommand::set_global_settings(
            self.uuid.as_str(),
            payload.clone(),
        ))?;
        self.global_settings.replace(payload);
        Ok(())
    }

    /// Asks the host to send `didReceiveGlobalSettings`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn request_global_settings(&self, sink: &mut dyn HostSink) -> Result<(), PluginError> {
        sink.send(OutboundCommand::get_global_settings(self.uuid.as_str()))
    }

    /// Instance bound to `context`.
    #[must_use]
    pub fn action(&self, context: &str) -> Option<&dyn Action> {
        self.instances.get(context).map(Box::as_ref)
    }

    /// Every instance of the action UUID `action_uuid`.
    #[must_use]
    pub fn actions_of(&self, action_uuid: &str) -> Vec<&dyn Action> {
        self.instances
            .values()
            .filter(|action| action.identity().action() == action_uuid)
            .map(Box::as_ref)
            .collect()
    }

    /// Last known plugin-wide settings.
    #[must_use]
    pub const fn global_settings(&self) -> &SettingsRecord {
        &self.global_settings
    }

    /// Number of live instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn create_instance(&mut self, event: &InboundEvent) {
        let (Some(context), Some(action)) = (event.context(), event.action()) else {
            warn!(
                target: DISPATCH_TARGET,
                event = event.name(),
                "willAppear without context or action"
            );
            return;
        };
        if self.instances.contains_key(context) {
            return;
        }
        let identity = ActionIdentity::new(action, context).with_device(event.device());
        let settings = SettingsRecord::from_value(&event.settings());
        match self.registry.create(identity, settings) {
            Ok(instance) => {
                debug!(target: DISPATCH_TARGET, context, action, "action instance created");
                self.instances.insert(context.to_owned(), instance);
            }
            Err(error) => {
                error!(target: DISPATCH_TARGET, context, error = %error, "cannot create action");
            }
        }
    }

    fn remove_instance(&mut self, event: &InboundEvent) {
        if let Some(context) = event.context()
            && self.instances.remove(context).is_some()
        {
            debug!(target: DISPATCH_TARGET, context, "action instance removed");
        }
    }

    fn route(&mut self, kind: EventKind, event: &InboundEvent, sink: &mut dyn HostSink) {
        let Some(context) = event.context() else {
            let error = PluginError::MissingContext {
                event: event.name().to_owned(),
            };
            warn!(target: DISPATCH_TARGET, error = %error, "dropping event");
            return;
        };
        let Self {
            uuid,
            instances,
            global_settings,
            ..
        } = self;
        let Some(instance) = instances.get_mut(context) else {
            debug!(
                target: DISPATCH_TARGET,
                event = event.name(),
                context,
                "no action instance for context"
            );
            return;
        };
        let mut mirror = MirroringSink::new(sink);
        deliver(kind, instance.as_mut(), event, global_settings, uuid, &mut mirror);
        mirror.apply(global_settings);
    }

    fn broadcast(&mut self, kind: EventKind, event: &InboundEvent, sink: &mut dyn HostSink) {
        let Self {
            uuid,
            instances,
            global_settings,
            ..
        } = self;
        let mut mirror = MirroringSink::new(sink);
        for instance in instances.values_mut() {
            deliver(kind, instance.as_mut(), event, global_settings, uuid, &mut mirror);
        }
        mirror.apply(global_settings);
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("uuid", &self.uuid)
            .field("registry", &self.registry)
            .field("contexts", &self.instances.keys().collect::<Vec<_>>())
            .field("global_settings", &self.global_settings)
            .finish()
    }
}

/// Forwards commands and remembers the last global settings written, so the
/// mirror follows writes made by action handlers.
struct MirroringSink<'a> {
    inner: &'a mut dyn HostSink,
    written_global: Option<Value>,
}

impl<'a> MirroringSink<'a> {
    const fn new(inner: &'a mut dyn HostSink) -> Self {
        Self {
            inner,
            written_global: None,
        }
    }

    fn apply(self, global: &mut SettingsRecord) {
        if let Some(payload) = self.written_global {
            global.replace(&payload);
        }
    }
}

impl HostSink for MirroringSink<'_> {
    fn send(&mut self, command: OutboundCommand) -> Result<(), PluginError> {
        let written = match &command {
            OutboundCommand::SetGlobalSettings { payload, .. } => Some(payload.clone()),
            _ => None,
        };
        self.inner.send(command)?;
        if written.is_some() {
            self.written_global = written;
        }
        Ok(())
    }
}

fn deliver(
    kind: EventKind,
    instance: &mut dyn Action,
    event: &InboundEvent,
    global: &SettingsRecord,
    plugin_uuid: &str,
    sink: &mut dyn HostSink,
) {
    let context = instance.identity().context().to_owned();
    let mut host = HostHandle::new(plugin_uuid, sink);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match kind {
        EventKind::WillAppear => instance.on_will_appear(event, &mut host),
        EventKind::WillDisappear => instance.on_will_disappear(event, &mut host),
        EventKind::DidReceiveSettings => instance.on_did_receive_settings(event, &mut host),
        EventKind::DidReceiveGlobalSettings => {
            instance.on_did_receive_global_settings(global, &mut host);
        }
        EventKind::SendToPlugin | EventKind::SendToPropertyInspector => {
            instance.on_send_to_plugin(event.payload(), &mut host);
        }
        EventKind::TitleParametersDidChange => {
            instance.on_title_parameters_did_change(event, &mut host);
        }
        EventKind::KeyDown => instance.on_key_down(event, &mut host),
        EventKind::KeyUp => instance.on_key_up(event, &mut host),
        EventKind::DialDown => instance.on_dial_down(event, &mut host),
        EventKind::DialUp => instance.on_dial_up(event, &mut host),
        EventKind::DialRotate => instance.on_dial_rotate(event, &mut host),
        EventKind::DeviceDidConnect => instance.on_device_did_connect(event, &mut host),
        EventKind::DeviceDidDisconnect => instance.on_device_did_disconnect(event, &mut host),
        EventKind::ApplicationDidLaunch => instance.on_application_did_launch(event, &mut host),
        EventKind::ApplicationDidTerminate => {
            instance.on_application_did_terminate(event, &mut host);
        }
        EventKind::SystemDidWakeUp => instance.on_system_did_wake_up(event, &mut host),
        EventKind::PropertyInspectorDidAppear => {
            instance.on_property_inspector_did_appear(event, &mut host);
        }
        EventKind::PropertyInspectorDidDisappear => {
            instance.on_property_inspector_did_disappear(event, &mut host);
        }
    }));
    if outcome.is_err() {
        let failure = PluginError::HandlerPanicked {
            event: event.name().to_owned(),
            context,
        };
        error!(target: DISPATCH_TARGET, error = %failure, "action handler failed");
    }
}

#[cfg(test)]
mod tests;
