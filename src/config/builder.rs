//! Engine configuration and builder.
//!
//! # Example
//!
//! ```ignore
//! use libtabnine::config::EngineConfig;
//!
//! let config = EngineConfig::builder()
//!     .binaries_dir("/path/to/plugin/binaries")
//!     .client("sublime")
//!     .client_version("4126")
//!     .plugin_version("3.2.1")
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::options::ClientMetadata;
use super::settings::EngineSettings;
use crate::{Error, Result};

/// Automatic restarts allowed between two reconfigurations.
pub const DEFAULT_MAX_RESTARTS: u32 = 10;

/// Configuration for launching and supervising the engine.
///
/// Use [`EngineConfig::builder()`] to create a new configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // Binary location
    pub(crate) binaries_dir: Option<PathBuf>,
    pub(crate) binary_path: Option<PathBuf>,

    // Command line
    pub(crate) metadata: ClientMetadata,
    pub(crate) log_file_path: Option<PathBuf>,
    pub(crate) extra_args: Vec<String>,
    pub(crate) env_vars: HashMap<String, String>,

    // Supervision
    pub(crate) max_restarts: u32,
    pub(crate) read_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Create a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Root directory holding one sub-directory per engine version.
    pub fn binaries_dir(&self) -> Option<&PathBuf> {
        self.binaries_dir.as_ref()
    }

    /// Explicit binary override, if any.
    pub fn binary_path(&self) -> Option<&PathBuf> {
        self.binary_path.as_ref()
    }

    /// Client identity reported to the engine.
    pub fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    /// Ceiling of the restart budget.
    pub fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    /// Read timeout for a single reply line, if set.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    binaries_dir: Option<PathBuf>,
    binary_path: Option<PathBuf>,
    metadata: ClientMetadata,
    log_file_path: Option<PathBuf>,
    extra_args: Vec<String>,
    env_vars: HashMap<String, String>,
    max_restarts: u32,
    read_timeout: Option<Duration>,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            binaries_dir: None,
            binary_path: None,
            metadata: ClientMetadata::default(),
            log_file_path: None,
            extra_args: Vec::new(),
            env_vars: HashMap::new(),
            max_restarts: DEFAULT_MAX_RESTARTS,
            read_timeout: None,
        }
    }
}

impl EngineConfigBuilder {
    // -------------------------------------------------------------------------
    // Binary location
    // -------------------------------------------------------------------------

    /// Directory containing versioned engine builds (`<dir>/<version>/<triple>/TabNine`).
    pub fn binaries_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binaries_dir = Some(dir.into());
        self
    }

    /// Use this binary directly and skip version resolution.
    pub fn binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    // -------------------------------------------------------------------------
    // Client identity
    // -------------------------------------------------------------------------

    /// Client identifier passed as `--client`.
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.metadata.client = client.into();
        self
    }

    /// Host editor version.
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.metadata.client_version = Some(version.into());
        self
    }

    /// Host editor plugin API version.
    pub fn client_api_version(mut self, version: impl Into<String>) -> Self {
        self.metadata.client_api_version = Some(version.into());
        self
    }

    /// Version of the plugin embedding this crate.
    pub fn plugin_version(mut self, version: impl Into<String>) -> Self {
        self.metadata.plugin_version = Some(version.into());
        self
    }

    /// Replace the whole client identity.
    pub fn metadata(mut self, metadata: ClientMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    // -------------------------------------------------------------------------
    // Engine arguments
    // -------------------------------------------------------------------------

    /// Ask the engine to log to this file.
    pub fn log_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file_path = Some(path.into());
        self
    }

    /// Extra arguments placed after the standard ones.
    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add/override environment variable for the engine.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Overlay the user's settings file onto this builder.
    ///
    /// Only fields present in the settings are applied.
    pub fn apply_settings(mut self, settings: &EngineSettings) -> Self {
        if let Some(ref path) = settings.custom_binary_path {
            self.binary_path = Some(path.clone());
        }
        if let Some(ref path) = settings.log_file_path {
            self.log_file_path = Some(path.clone());
        }
        if let Some(ref args) = settings.extra_args {
            self.extra_args = args.clone();
        }
        self
    }

    // -------------------------------------------------------------------------
    // Supervision
    // -------------------------------------------------------------------------

    /// Automatic restarts allowed between two reconfigurations (default 10).
    pub fn max_restarts(mut self, max: u32) -> Self {
        self.max_restarts = max;
        self
    }

    /// Give up on a reply line after this long (default: wait forever).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - A binaries directory or an explicit binary path is set
    /// - The client identifier is not empty
    /// - The read timeout is non-zero if set
    ///
    /// Note: the binary itself is resolved lazily at spawn time.
    pub fn build(self) -> Result<EngineConfig> {
        if self.binaries_dir.is_none() && self.binary_path.is_none() {
            return Err(Error::InvalidConfig(
                "either binaries_dir or binary_path must be set".into(),
            ));
        }

        if self.metadata.client.trim().is_empty() {
            return Err(Error::InvalidConfig("client identifier is empty".into()));
        }

        if self.read_timeout == Some(Duration::ZERO) {
            return Err(Error::InvalidConfig("read_timeout must be non-zero".into()));
        }

        Ok(EngineConfig {
            binaries_dir: self.binaries_dir,
            binary_path: self.binary_path,
            metadata: self.metadata,
            log_file_path: self.log_file_path,
            extra_args: self.extra_args,
            env_vars: self.env_vars,
            max_restarts: self.max_restarts,
            read_timeout: self.read_timeout,
        })
    }
}
