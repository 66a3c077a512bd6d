//! The host's engine settings, as stored in its settings file.
//!
//! Loading the file and watching it for changes is the host's job. When it
//! changes, the host rebuilds an [`EngineConfig`](super::EngineConfig) with
//! [`apply_settings`](super::EngineConfigBuilder::apply_settings) and calls
//! `Supervisor::reconfigure_with`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// User-editable engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Use this engine binary instead of resolving one from the binaries directory.
    pub custom_binary_path: Option<PathBuf>,
    /// Ask the engine to write its log here.
    pub log_file_path: Option<PathBuf>,
    /// Extra arguments appended after the standard ones.
    pub extra_args: Option<Vec<String>>,
}

impl EngineSettings {
    /// Parse settings from the JSON text of a settings file.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::json_parse(e, raw))
    }
}
