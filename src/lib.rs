//! # libtabnine
//!
//! Rust supervisor and client for the TabNine completion engine.
//!
//! This library runs the engine as a child process and talks to it over
//! newline-delimited JSON, supporting:
//! - Resolving the newest installed engine build for the current platform
//! - Bounded automatic restarts when the engine crashes or misbehaves
//! - Typed request builders and replies for editor plugins
//!
//! No failure ever reaches the editor as a panic or a blocking error: calls
//! that cannot be answered return `None` and the cause is logged with
//! [`tracing`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use libtabnine::protocol::AutocompleteRequest;
//! use libtabnine::{EngineClient, Result};
//!
//! fn main() -> Result<()> {
//!     let client = EngineClient::builder()
//!         .binaries_dir("/home/me/.tabnine/binaries")
//!         .client_version("4169")
//!         .plugin_version("1.0.0")
//!         .build()?;
//!
//!     let request = AutocompleteRequest::new("fn main() {\n    let v = Vec::", "\n}", Some("main.rs"));
//!     if let Some(reply) = client.autocomplete(request) {
//!         for candidate in reply.results {
//!             println!("{}", candidate.new_prefix);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Reconfiguration
//!
//! ```ignore
//! use libtabnine::config::{EngineConfig, EngineSettings};
//!
//! let settings = EngineSettings::from_json_str(&std::fs::read_to_string(path)?)?;
//! let config = EngineConfig::builder()
//!     .binaries_dir(binaries)
//!     .apply_settings(&settings)
//!     .build()?;
//!
//! // Resets the restart budget and starts a fresh engine.
//! client.reconfigure_with_config(config)?;
//! ```

pub mod binary;
mod client;
pub mod config;
mod error;
pub mod process;
pub mod protocol;
pub mod supervisor;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::{ClientBuilder, EngineClient};
pub use supervisor::{Supervisor, SupervisorState};

// Re-export commonly used config types at crate root
pub use config::{ClientMetadata, EngineConfig, EngineConfigBuilder, EngineSettings};
