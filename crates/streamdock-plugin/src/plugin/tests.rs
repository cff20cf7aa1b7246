//! Unit tests for the dispatcher.

use std::sync::Arc;

use mockall::{mock, predicate};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::bridge::{DIAGNOSTIC_KEY, MirrorBridge};
use crate::sink::OutboundQueue;

mock! {
    Sink {}
    impl HostSink for Sink {
        fn send(&mut self, command: OutboundCommand) -> Result<(), PluginError>;
    }
}

const PLUGIN: &str = "com.tunl.volume";
const SETTINGS_ACTION: &str = "com.tunl.volume.settings";

struct ScriptedAction {
    identity: ActionIdentity,
    settings: SettingsRecord,
}

impl Action for ScriptedAction {
    fn identity(&self) -> &ActionIdentity {
        &self.identity
    }

    fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SettingsRecord {
        &mut self.settings
    }

    fn on_key_down(&mut self, _event: &InboundEvent, host: &mut HostHandle<'_>) {
        host.set_global_settings(json!({"pressed": self.identity.context()}))
            .expect("queue global settings");
    }

    fn on_key_up(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {
        panic!("key up is not supported");
    }

    fn on_system_did_wake_up(&mut self, _event: &InboundEvent, _host: &mut HostHandle<'_>) {
        self.settings.insert("woke", json!(true));
    }
}

#[fixture]
fn plugin() -> Plugin {
    let mut registry = ActionRegistry::with_defaults(Arc::new(MirrorBridge));
    registry
        .register("scripted", |identity, settings| {
            Box::new(ScriptedAction { identity, settings })
        })
        .expect("register scripted");
    Plugin::new(PLUGIN, registry)
}

fn appear(context: &str, action: &str, settings: serde_json::Value) -> InboundEvent {
    InboundEvent::new(EventKind::WillAppear)
        .with_context(context)
        .with_action(action)
        .with_device("dev-1")
        .with_payload(json!({"settings": settings}))
}

#[rstest]
fn will_appear_creates_seeded_instance(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({"a": 1})), &mut queue);

    let action = plugin.action("ctx-1").expect("instance exists");
    assert_eq!(action.settings().get("a"), Some(&json!(1)));
    assert_eq!(action.identity().device(), Some("dev-1"));
    assert!(queue.is_empty());
}

#[rstest]
fn repeated_will_appear_keeps_existing_instance(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({"a": 1})), &mut queue);
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({"a": 2})), &mut queue);

    assert_eq!(plugin.instance_count(), 1);
    let action = plugin.action("ctx-1").expect("instance exists");
    assert_eq!(action.settings().get("a"), Some(&json!(1)));
}

#[rstest]
fn unregistered_action_is_skipped(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", "com.tunl.volume.unknown", json!({})), &mut queue);
    assert_eq!(plugin.instance_count(), 0);
}

#[rstest]
fn will_disappear_removes_instance(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({})), &mut queue);
    plugin.dispatch(
        &InboundEvent::new(EventKind::WillDisappear).with_context("ctx-1"),
        &mut queue,
    );
    assert!(plugin.action("ctx-1").is_none());
}

#[rstest]
fn did_receive_settings_merges_before_relay(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({"keep": 1})), &mut queue);
    plugin.dispatch(
        &InboundEvent::new(EventKind::DidReceiveSettings)
            .with_context("ctx-1")
            .with_action(SETTINGS_ACTION)
            .with_payload(json!({"settings": {"foo": "bar"}})),
        &mut queue,
    );

    let settings = plugin.action("ctx-1").expect("instance").settings();
    assert_eq!(settings.get("keep"), Some(&json!(1)));
    assert_eq!(settings.get("foo"), Some(&json!("bar")));
    assert!(settings.contains_key(DIAGNOSTIC_KEY));
    assert_eq!(queue.count_of("sendToPropertyInspector"), 1);
    assert_eq!(queue.count_of("setGlobalSettings"), 1);
}

#[rstest]
fn relayed_global_update_refreshes_mirror(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({})), &mut queue);
    plugin.dispatch(
        &InboundEvent::new(EventKind::DidReceiveSettings)
            .with_context("ctx-1")
            .with_payload(json!({"settings": {}})),
        &mut queue,
    );
    assert_eq!(
        plugin.global_settings().get("lastContext"),
        Some(&json!("ctx-1"))
    );
}

#[rstest]
fn events_for_unknown_context_are_ignored(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(
        &InboundEvent::new(EventKind::DidReceiveSettings)
            .with_context("ghost")
            .with_payload(json!({"settings": {"foo": "bar"}})),
        &mut queue,
    );
    assert!(queue.is_empty());
    assert_eq!(plugin.instance_count(), 0);
}

#[rstest]
fn global_settings_replace_mirror_and_reach_every_instance(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({"a": 1})), &mut queue);
    plugin.dispatch(&appear("ctx-2", SETTINGS_ACTION, json!({"b": 2})), &mut queue);
    plugin
        .set_global_settings(&json!({"stale": true}), &mut queue)
        .expect("queue global settings");

    plugin.dispatch(
        &InboundEvent::new(EventKind::DidReceiveGlobalSettings)
            .with_payload(json!({"settings": {"volume": 7}})),
        &mut queue,
    );

    assert_eq!(plugin.global_settings().to_value(), json!({"volume": 7}));
    let first = plugin.action("ctx-1").expect("first");
    let second = plugin.action("ctx-2").expect("second");
    assert_eq!(first.settings().to_value(), json!({"a": 1}));
    assert_eq!(second.settings().to_value(), json!({"b": 2}));
}

#[rstest]
fn broadcast_events_reach_every_instance(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", "com.tunl.volume.scripted", json!({})), &mut queue);
    plugin.dispatch(&appear("ctx-2", "com.tunl.volume.scripted", json!({})), &mut queue);

    plugin.dispatch(&InboundEvent::new(EventKind::SystemDidWakeUp), &mut queue);

    for action in plugin.actions_of("com.tunl.volume.scripted") {
        assert_eq!(action.settings().get("woke"), Some(&json!(true)));
    }
    assert_eq!(plugin.actions_of("com.tunl.volume.scripted").len(), 2);
}

#[rstest]
fn handler_writes_to_global_settings_update_mirror(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-9", "com.tunl.volume.scripted", json!({})), &mut queue);
    plugin.dispatch(
        &InboundEvent::new(EventKind::KeyDown).with_context("ctx-9"),
        &mut queue,
    );
    assert_eq!(plugin.global_settings().to_value(), json!({"pressed": "ctx-9"}));
    assert_eq!(queue.count_of("setGlobalSettings"), 1);
}

#[rstest]
fn panicking_handler_is_contained(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-9", "com.tunl.volume.scripted", json!({})), &mut queue);
    plugin.dispatch(
        &InboundEvent::new(EventKind::KeyUp).with_context("ctx-9"),
        &mut queue,
    );
    assert_eq!(plugin.instance_count(), 1);
}

#[rstest]
fn unknown_events_are_skipped(mut plugin: Plugin) {
    let mut queue = OutboundQueue::new();
    plugin
        .handle_frame(r#"{"event":"touchTap","context":"ctx"}"#, &mut queue)
        .expect("unknown events decode");
    assert!(queue.is_empty());
}

#[rstest]
#[case("not json")]
#[case("[1,2]")]
#[case(r#"{"context":"ctx"}"#)]
fn malformed_frames_are_reported(mut plugin: Plugin, #[case] frame: &str) {
    let mut queue = OutboundQueue::new();
    let error = plugin
        .handle_frame(frame, &mut queue)
        .expect_err("frame must be rejected");
    assert!(matches!(error, PluginError::MalformedEvent { .. }));
}

#[rstest]
fn failed_global_write_keeps_mirror(mut plugin: Plugin) {
    let mut sink = MockSink::new();
    sink.expect_send()
        .with(predicate::eq(OutboundCommand::set_global_settings(
            PLUGIN,
            json!({"x": 1}),
        )))
        .times(1)
        .returning(|command| {
            Err(PluginError::Outbound {
                event: command.event_name().to_owned(),
                message: "closed".to_owned(),
            })
        });

    let result = plugin.set_global_settings(&json!({"x": 1}), &mut sink);

    assert!(result.is_err());
    assert!(plugin.global_settings().is_empty());
}

#[rstest]
fn registration_and_request_use_plugin_uuid(plugin: Plugin) {
    assert_eq!(plugin.registration("registerPlugin"), Registration::new("registerPlugin", PLUGIN));
    let mut queue = OutboundQueue::new();
    plugin
        .request_global_settings(&mut queue)
        .expect("queue request");
    assert_eq!(
        queue.commands(),
        &[OutboundCommand::get_global_settings(PLUGIN)]
    );
}

#[rstest]
#[case::null(r#"{"event":"didReceiveSettings","context":"ctx-1","payload":{"settings":null}}"#)]
#[case::number(r#"{"event":"didReceiveSettings","context":"ctx-1","payload":{"settings":7}}"#)]
#[case::absent(r#"{"event":"didReceiveSettings","context":"ctx-1"}"#)]
fn odd_settings_frames_relay_once_and_keep_state(mut plugin: Plugin, #[case] frame: &str) {
    let mut queue = OutboundQueue::new();
    plugin.dispatch(&appear("ctx-1", SETTINGS_ACTION, json!({"v": 1})), &mut queue);

    plugin
        .handle_frame(frame, &mut queue)
        .expect("frame decodes");

    let settings = plugin.action("ctx-1").expect("instance").settings();
    assert_eq!(settings.get("v"), Some(&json!(1)));
    assert!(settings.contains_key(DIAGNOSTIC_KEY));
    assert_eq!(queue.count_of("sendToPropertyInspector"), 1);
    assert_eq!(queue.count_of("setGlobalSettings"), 1);
}
