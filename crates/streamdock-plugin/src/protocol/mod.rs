//! Wire types for the host WebSocket protocol.
//!
//! The host sends one JSON object per text frame, tagged by an `event` field,
//! and accepts commands of the same shape. Inbound frames are decoded
//! leniently because the host owns the format: unknown events and missing
//! fields are tolerated and reported by the dispatcher instead of failing.

mod inbound;
mod info;
mod outbound;

pub use inbound::{EventKind, EventScope, InboundEvent};
pub use info::{ApplicationInfo, DeviceInfo, DeviceSize, HostInfo, PluginInfo, RAW_INFO_KEY};
pub use outbound::{
    MessagePayload, OutboundCommand, Registration, StatePayload, TitlePayload, UrlPayload,
};
