//! Configuration for launching the engine.
//!
//! This module provides:
//!
//! - [`EngineConfig`] and [`EngineConfigBuilder`] for configuring the supervisor
//! - [`ClientMetadata`] for the client identity passed on the command line
//! - [`EngineSettings`] for the user-editable settings file
//!
//! # Example
//!
//! ```ignore
//! use libtabnine::config::{EngineConfig, EngineSettings};
//!
//! let settings = EngineSettings::from_json_str(&std::fs::read_to_string(path)?)?;
//! let config = EngineConfig::builder()
//!     .binaries_dir(plugin_dir.join("binaries"))
//!     .client_version("4126")
//!     .apply_settings(&settings)
//!     .build()?;
//! ```

pub mod builder;
pub mod options;
pub mod settings;

// Re-export commonly used types
pub use builder::{EngineConfig, EngineConfigBuilder, DEFAULT_MAX_RESTARTS};
pub use options::{ClientMetadata, DEFAULT_CLIENT, UNKNOWN_VERSION};
pub use settings::EngineSettings;
