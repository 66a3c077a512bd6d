//! Process management for the engine.
//!
//! This module handles spawning and communicating with the engine subprocess.
//! One engine process serves every request until it dies or is replaced.
//!
//! # Architecture
//!
//! ```text
//! libtabnine                            engine
//! ┌──────────────┐                   ┌─────────────┐
//! │ EngineProcess│──stdin (request)─▶│             │
//! │              │◀─stdout (reply)───│             │
//! │              │◀─stderr (merged)──│             │
//! └──────────────┘                   └─────────────┘
//! ```
//!
//! # Protocol
//!
//! One JSON document per line in each direction. A request line is written
//! and flushed, then exactly one line is read back before the next request.
//!
//! # Seams
//!
//! The supervisor only sees the [`Launcher`] and [`EngineHandle`] traits, so
//! tests can stand in engines that crash, hang or reply with garbage.

mod io;
mod spawn;

pub use io::{ProcessReader, ProcessWriter};
pub use spawn::{EngineLauncher, EngineProcess};

use crate::Result;

/// Starts engine processes for the supervisor.
pub trait Launcher: Send {
    /// The handle to a started engine.
    type Handle: EngineHandle;

    /// Resolve the binary and spawn a fresh engine.
    fn launch(&mut self) -> Result<Self::Handle>;
}

/// A started engine as seen by the supervisor.
pub trait EngineHandle: Send {
    /// Operating system process id, if there is one.
    fn id(&self) -> Option<u32>;

    /// Poll liveness without blocking.
    fn has_exited(&mut self) -> bool;

    /// Write one newline-terminated line and flush it.
    fn write_line(&mut self, line: &[u8]) -> Result<()>;

    /// Block until one line arrives.
    fn read_line(&mut self) -> Result<Vec<u8>>;

    /// Stop the engine.
    fn terminate(&mut self) -> Result<()>;
}
