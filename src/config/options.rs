//! Client identity reported to the engine on its command line.

use serde::{Deserialize, Serialize};

/// Client identifier passed as `--client` when none is configured.
pub const DEFAULT_CLIENT: &str = "sublime";

/// Placeholder for any version the host cannot report.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Who is talking to the engine.
///
/// Rendered as `--client <client>` and, at the very end of the argument list,
/// `--client-metadata clientVersion=.. clientApiVersion=.. pluginVersion=..`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// Client identifier (the editor integration's name).
    pub client: String,
    /// Version of the host editor.
    #[serde(default)]
    pub client_version: Option<String>,
    /// Version of the editor's plugin API. Falls back to `client_version`.
    #[serde(default)]
    pub client_api_version: Option<String>,
    /// Version of the plugin embedding this crate.
    #[serde(default)]
    pub plugin_version: Option<String>,
}

impl Default for ClientMetadata {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT.to_string(),
            client_version: None,
            client_api_version: None,
            plugin_version: None,
        }
    }
}

impl ClientMetadata {
    /// Create metadata for the given client identifier.
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ..Default::default()
        }
    }

    /// Trailing `--client-metadata` arguments.
    pub fn to_args(&self) -> Vec<String> {
        let client_version = non_empty(self.client_version.as_deref());
        let api_version = non_empty(self.client_api_version.as_deref()).or(client_version);
        let plugin_version = non_empty(self.plugin_version.as_deref());

        vec![
            "--client-metadata".to_string(),
            format!("clientVersion={}", client_version.unwrap_or(UNKNOWN_VERSION)),
            format!("clientApiVersion={}", api_version.unwrap_or(UNKNOWN_VERSION)),
            format!("pluginVersion={}", plugin_version.unwrap_or(UNKNOWN_VERSION)),
        ]
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
