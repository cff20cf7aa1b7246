//! Plugin-side logic for a Stream Dock hardware panel plugin.
//!
//! The host application talks to the plugin over a WebSocket using JSON
//! events. This crate holds everything that does not touch the socket:
//!
//! - [`protocol`]: inbound events, outbound commands, launch `-info`.
//! - [`settings`]: the settings record mirrored per instance and globally.
//! - [`bridge`]: the settings synchronisation hooks and their default
//!   implementation.
//! - [`action`] and [`registry`]: per-context action instances and the
//!   factories that create them.
//! - [`plugin`]: the dispatcher that routes events to instances.
//!
//! The runtime crate supplies the socket and flushes the [`OutboundQueue`]
//! after every dispatch.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use streamdock_plugin::{ActionRegistry, MirrorBridge, OutboundQueue, Plugin};
//!
//! let registry = ActionRegistry::with_defaults(Arc::new(MirrorBridge));
//! let mut plugin = Plugin::new("com.tunl.volume", registry);
//! let mut queue = OutboundQueue::new();
//!
//! plugin
//!     .handle_frame(
//!         r#"{"event":"willAppear","context":"c1","action":"com.tunl.volume.settings","payload":{"settings":{}}}"#,
//!         &mut queue,
//!     )
//!     .unwrap();
//! plugin
//!     .handle_frame(
//!         r#"{"event":"didReceiveSettings","context":"c1","payload":{"settings":{"foo":"bar"}}}"#,
//!         &mut queue,
//!     )
//!     .unwrap();
//!
//! assert_eq!(queue.count_of("sendToPropertyInspector"), 1);
//! assert_eq!(queue.count_of("setGlobalSettings"), 1);
//! ```

pub mod action;
pub mod bridge;
mod error;
pub mod plugin;
pub mod protocol;
pub mod registry;
pub mod settings;
pub mod sink;

pub use action::{Action, ActionIdentity, SettingsAction, TestAction};
pub use bridge::{MirrorBridge, RelayTarget, SettingsBridge};
pub use error::PluginError;
pub use plugin::Plugin;
pub use protocol::{EventKind, HostInfo, InboundEvent, OutboundCommand, Registration};
pub use registry::{ActionFactory, ActionRegistry};
pub use settings::{MergeOutcome, SettingsRecord};
pub use sink::{HostHandle, HostSink, OutboundQueue};

#[cfg(test)]
mod tests;
