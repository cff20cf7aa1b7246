//! The `-info` launch argument describing the host and attached devices.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::PluginError;

/// Tracing target for launch info decoding.
const INFO_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::info");

/// Key under which [`HostInfo::parse_lenient`] keeps text it could not decode.
pub const RAW_INFO_KEY: &str = "raw";

/// Host and device description passed at launch.
///
/// Only the fields the runtime logs are modelled; everything else is kept
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    /// Host application details.
    #[serde(default)]
    pub application: ApplicationInfo,
    /// Details of this plugin as installed.
    #[serde(default)]
    pub plugin: PluginInfo,
    /// Devices attached at launch.
    #[serde(default)]
    pub devices: Vec<DeviceInfo>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HostInfo {
    /// Parses the `-info` argument.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MalformedEvent`] when the text is not a JSON
    /// object of the expected shape.
    pub fn parse(text: &str) -> Result<Self, PluginError> {
        serde_json::from_str(text).map_err(|source| PluginError::MalformedEvent {
            message: "launch info is not a valid host description".to_owned(),
            source: Some(source),
        })
    }

    /// Parses the `-info` argument, falling back to an empty description
    /// when the text does not match the expected shape. The undecoded text
    /// is kept in `extra` under [`RAW_INFO_KEY`].
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        match Self::parse(text) {
            Ok(info) => info,
            Err(error) => {
                warn!(target: INFO_TARGET, error = %error, "using defaults for launch info");
                let mut extra = Map::new();
                extra.insert(RAW_INFO_KEY.to_owned(), Value::String(text.to_owned()));
                Self {
                    extra,
                    ..Self::default()
                }
            }
        }
    }
}

/// Host application details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// UI language code.
    #[serde(default)]
    pub language: String,
    /// Operating system identifier (`windows`, `mac`).
    #[serde(default)]
    pub platform: String,
    /// Host application version.
    #[serde(default)]
    pub version: String,
}

/// Installed plugin details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Plugin UUID from the manifest.
    #[serde(default)]
    pub uuid: String,
    /// Plugin version from the manifest.
    #[serde(default)]
    pub version: String,
}

/// A panel device attached to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device identifier used in device events.
    #[serde(default)]
    pub id: String,
    /// Human-readable device name.
    #[serde(default)]
    pub name: String,
    /// Host-specific device model code.
    #[serde(rename = "type", default)]
    pub device_type: Option<i64>,
    /// Key grid size.
    #[serde(default)]
    pub size: DeviceSize,
}

/// Key grid dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSize {
    /// Number of key columns.
    #[serde(default)]
    pub columns: u32,
    /// Number of key rows.
    #[serde(default)]
    pub rows: u32,
}
