//! Tests for the host event loop.

use std::collections::VecDeque;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use streamdock_plugin::{ActionRegistry, MirrorBridge};

use super::*;

mock! {
    Channel {}
    impl HostChannel for Channel {
        fn receive(&mut self) -> Result<Option<String>, ConnectionError>;
        fn send(&mut self, frame: &str) -> Result<(), ConnectionError>;
    }
}

const PLUGIN_UUID: &str = "com.tunl.volume";

#[derive(Default)]
struct ScriptedChannel {
    inbound: VecDeque<String>,
    sent: Vec<Value>,
}

impl ScriptedChannel {
    fn with_frames(frames: &[Value]) -> Self {
        Self {
            inbound: frames.iter().map(Value::to_string).collect(),
            sent: Vec::new(),
        }
    }

    fn push_raw(&mut self, frame: &str) {
        self.inbound.push_back(frame.to_owned());
    }

    fn sent_events(&self) -> Vec<&str> {
        self.sent
            .iter()
            .filter_map(|frame| frame.get("event").and_then(Value::as_str))
            .collect()
    }
}

impl HostChannel for ScriptedChannel {
    fn receive(&mut self) -> Result<Option<String>, ConnectionError> {
        Ok(self.inbound.pop_front())
    }

    fn send(&mut self, frame: &str) -> Result<(), ConnectionError> {
        let value = serde_json::from_str(frame).expect("outbound frames are JSON");
        self.sent.push(value);
        Ok(())
    }
}

#[fixture]
fn plugin() -> Plugin {
    Plugin::new(
        PLUGIN_UUID,
        ActionRegistry::with_defaults(Arc::new(MirrorBridge)),
    )
}

fn will_appear() -> Value {
    json!({
        "event": "willAppear",
        "context": "ctx-1",
        "action": "com.tunl.volume.settings",
        "device": "dev-1",
        "payload": {"settings": {}}
    })
}

fn did_receive_settings(settings: &Value) -> Value {
    json!({
        "event": "didReceiveSettings",
        "context": "ctx-1",
        "action": "com.tunl.volume.settings",
        "payload": {"settings": settings}
    })
}

#[rstest]
fn registers_then_requests_global_settings(mut plugin: Plugin) {
    let mut channel = ScriptedChannel::default();
    serve(&mut plugin, &mut channel, "registerPlugin").expect("serve completes");

    assert_eq!(
        channel.sent,
        vec![
            json!({"event": "registerPlugin", "uuid": PLUGIN_UUID}),
            json!({"event": "getGlobalSettings", "context": PLUGIN_UUID}),
        ]
    );
}

#[rstest]
fn settings_frames_are_relayed_in_order(mut plugin: Plugin) {
    let foo = json!({"foo": "bar"});
    let mut channel = ScriptedChannel::with_frames(&[
        will_appear(),
        did_receive_settings(&foo),
        did_receive_settings(&foo),
    ]);

    serve(&mut plugin, &mut channel, "registerPlugin").expect("serve completes");

    assert_eq!(
        channel.sent_events(),
        vec![
            "registerPlugin",
            "getGlobalSettings",
            "sendToPropertyInspector",
            "setGlobalSettings",
            "sendToPropertyInspector",
            "setGlobalSettings",
        ]
    );
    let action = plugin.action("ctx-1").expect("instance exists");
    assert_eq!(action.settings().get("foo"), Some(&json!("bar")));
}

#[rstest]
fn malformed_frames_are_skipped(mut plugin: Plugin) {
    let mut channel = ScriptedChannel::default();
    channel.push_raw("{not json");
    channel.push_raw(&will_appear().to_string());
    channel.push_raw(r#"{"payload":{}}"#);
    channel.push_raw(&did_receive_settings(&json!({})).to_string());

    serve(&mut plugin, &mut channel, "registerPlugin").expect("serve completes");

    assert_eq!(plugin.instance_count(), 1);
    assert_eq!(channel.sent.len(), 4);
}

#[rstest]
fn send_failures_end_the_loop(mut plugin: Plugin) {
    let mut channel = MockChannel::new();
    channel
        .expect_send()
        .times(1)
        .returning(|_| Err(ConnectionError::Send(Box::new(tungstenite::Error::AlreadyClosed))));
    channel.expect_receive().never();

    let error = serve(&mut plugin, &mut channel, "registerPlugin").expect_err("send fails");
    assert!(matches!(error, ConnectionError::Send(_)));
}

#[rstest]
fn receive_failures_end_the_loop(mut plugin: Plugin) {
    let mut channel = MockChannel::new();
    channel.expect_send().times(2).returning(|_| Ok(()));
    channel
        .expect_receive()
        .times(1)
        .returning(|| Err(ConnectionError::Receive(Box::new(tungstenite::Error::AlreadyClosed))));

    let error = serve(&mut plugin, &mut channel, "registerPlugin").expect_err("receive fails");
    assert!(matches!(error, ConnectionError::Receive(_)));
}

fn read_json(socket: &mut WebSocket<TcpStream>) -> Value {
    match socket.read() {
        Ok(Message::Text(text)) => serde_json::from_str(&text).expect("json frame"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[rstest]
fn serves_a_real_websocket_host(mut plugin: Plugin) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local address").port();

    let host = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept plugin");
        let mut socket = tungstenite::accept(stream).expect("websocket handshake");
        let mut received = vec![read_json(&mut socket), read_json(&mut socket)];
        for frame in [will_appear(), did_receive_settings(&json!({"foo": "bar"}))] {
            socket
                .send(Message::Text(frame.to_string()))
                .expect("send event");
        }
        received.push(read_json(&mut socket));
        received.push(read_json(&mut socket));
        socket.close(None).expect("start close");
        while socket.read().is_ok() {}
        received
    });

    let mut channel =
        WebSocketChannel::connect(&format!("ws://127.0.0.1:{port}")).expect("connect to host");
    serve(&mut plugin, &mut channel, "registerPlugin").expect("serve until close");
    drop(channel);

    let received = host.join().expect("host thread");
    let events: Vec<&str> = received
        .iter()
        .filter_map(|frame| frame.get("event").and_then(Value::as_str))
        .collect();
    assert_eq!(
        events,
        vec![
            "registerPlugin",
            "getGlobalSettings",
            "sendToPropertyInspector",
            "setGlobalSettings",
        ]
    );
    assert_eq!(
        received.get(3).and_then(|frame| frame.pointer("/payload/lastSettings/foo")),
        Some(&json!("bar"))
    );
}
