//! Engine process supervision.
//!
//! The [`Supervisor`] owns the one active engine process and decides when to
//! replace it:
//!
//! ```text
//! NoProcess ──first request──▶ Running ──exit / bad reply──▶ Dead ──budget left──▶ Running
//!                                                              │
//!                                                              └──budget spent──▶ Exhausted
//! ```
//!
//! Every failure costs one unit of the [`RestartBudget`] and yields `None` for
//! the call that hit it; the replacement engine serves the next call. Once the
//! budget is spent every call returns `None` without touching a process until
//! [`Supervisor::reconfigure`] resets it.
//!
//! All state changes and the write/read exchange happen under one lock, so
//! concurrent callers never interleave lines on the same pipes.

mod budget;

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

pub use budget::RestartBudget;

use crate::config::EngineConfig;
use crate::process::{EngineHandle, EngineLauncher, Launcher};
use crate::protocol::decode_response;
use crate::{Error, Result};

/// Lifecycle state of the supervised engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Nothing has been started yet (or the engine was shut down).
    NoProcess,
    /// An engine is up and believed healthy.
    Running,
    /// The last engine died, misbehaved or failed to start.
    Dead,
    /// The restart budget is spent; waiting for a reconfiguration.
    Exhausted,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::NoProcess => write!(f, "no-process"),
            SupervisorState::Running => write!(f, "running"),
            SupervisorState::Dead => write!(f, "dead"),
            SupervisorState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Owns the engine process and restarts it within a bounded budget.
///
/// The host creates one supervisor at startup and shares it by reference
/// (or `Arc`) with everything that talks to the engine.
///
/// # Example
///
/// ```ignore
/// let supervisor = Supervisor::new(config);
/// let reply = supervisor.interact(b"{\"version\":\"2.0.0\",\"request\":{\"Features\":{}}}\n");
/// ```
pub struct Supervisor<L: Launcher = EngineLauncher> {
    inner: Mutex<Inner<L>>,
}

struct Inner<L: Launcher> {
    launcher: L,
    active: Option<L::Handle>,
    budget: RestartBudget,
    state: SupervisorState,
    spawns: u64,
}

impl Supervisor<EngineLauncher> {
    /// Create a supervisor that launches real engine processes.
    ///
    /// Nothing is spawned until the first request.
    pub fn new(config: EngineConfig) -> Self {
        let max_restarts = config.max_restarts();
        Self::with_launcher(EngineLauncher::new(config), max_restarts)
    }

    /// Apply new settings: swap the config, reset the budget, restart.
    pub fn reconfigure_with_config(&self, config: EngineConfig) -> Result<()> {
        let mut inner = self.lock();
        inner.budget = RestartBudget::new(config.max_restarts());
        inner.launcher = EngineLauncher::new(config);
        tracing::info!("engine configuration changed, restarting");
        inner.restart()
    }
}

impl<L: Launcher> Supervisor<L> {
    /// Create a supervisor around any launcher.
    pub fn with_launcher(launcher: L, max_restarts: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                launcher,
                active: None,
                budget: RestartBudget::new(max_restarts),
                state: SupervisorState::NoProcess,
                spawns: 0,
            }),
        }
    }

    /// Send one request line and read one reply.
    ///
    /// Never fails: every problem is logged and reported as `None`.
    pub fn interact(&self, line: &[u8]) -> Option<Value> {
        match self.try_interact(line) {
            Ok(reply) => Some(reply),
            Err(Error::BudgetExhausted { .. }) => {
                tracing::debug!("engine restart budget exhausted, skipping request");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "no reply from engine");
                None
            }
        }
    }

    /// Like [`interact`](Self::interact) but reports why there was no reply.
    ///
    /// The failure handling is identical: a failed exchange still costs one
    /// restart and the error describes the failure, not the restart.
    pub fn try_interact(&self, line: &[u8]) -> Result<Value> {
        self.lock().interact(line)
    }

    /// Make sure an engine is running, starting one if needed.
    ///
    /// Replacing a dead engine costs one restart, as it would inside
    /// [`interact`](Self::interact).
    pub fn ensure_running(&self) -> Result<()> {
        let mut inner = self.lock();
        match inner.ensure_running() {
            Err(e) if inner.state != SupervisorState::Running => Err(e),
            _ => Ok(()),
        }
    }

    /// Replace the engine with a fresh one.
    ///
    /// The restart budget is neither charged nor reset.
    pub fn restart(&self) -> Result<()> {
        self.lock().restart()
    }

    /// Reset the restart budget and start a fresh engine.
    ///
    /// This is the entry point for the host's settings-changed event.
    pub fn reconfigure(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.budget.reset();
        tracing::info!("engine reconfigured, restarting");
        inner.restart()
    }

    /// Swap the launcher, reset the restart budget and start a fresh engine.
    pub fn reconfigure_with(&self, launcher: L) -> Result<()> {
        let mut inner = self.lock();
        inner.launcher = launcher;
        inner.budget.reset();
        tracing::info!("engine launcher replaced, restarting");
        inner.restart()
    }

    /// Stop the engine. A later request starts a new one.
    ///
    /// An exhausted supervisor stays exhausted until reconfigured.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.terminate_active();
        if inner.state != SupervisorState::Exhausted {
            inner.state = SupervisorState::NoProcess;
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.lock().state
    }

    /// Automatic restarts since the last reconfiguration.
    pub fn restart_count(&self) -> u32 {
        self.lock().budget.used()
    }

    /// Launch attempts since this supervisor was created.
    pub fn spawn_count(&self) -> u64 {
        self.lock().spawns
    }

    /// Process id of the active engine.
    pub fn pid(&self) -> Option<u32> {
        self.lock().active.as_ref().and_then(|h| h.id())
    }

    fn lock(&self) -> MutexGuard<'_, Inner<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L: Launcher> Drop for Supervisor<L> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.terminate_active();
    }
}

impl<L: Launcher> Inner<L> {
    fn interact(&mut self, line: &[u8]) -> Result<Value> {
        self.ensure_running()?;

        match self.exchange(line) {
            Ok(reply) => Ok(reply),
            Err(e) => {
                self.state = SupervisorState::Dead;
                Err(self.recover(e))
            }
        }
    }

    fn ensure_running(&mut self) -> Result<()> {
        match self.state {
            SupervisorState::Exhausted => {
                return Err(Error::BudgetExhausted {
                    restarts: self.budget.used(),
                })
            }
            SupervisorState::NoProcess => return self.restart(),
            SupervisorState::Dead => return Err(self.recover(Error::ProcessDead)),
            SupervisorState::Running => {}
        }

        let exited = self.active.as_mut().map_or(true, |h| h.has_exited());
        if exited {
            tracing::warn!("engine process is dead");
            self.state = SupervisorState::Dead;
            return Err(self.recover(Error::ProcessDead));
        }
        Ok(())
    }

    fn exchange(&mut self, line: &[u8]) -> Result<Value> {
        let handle = self.active.as_mut().ok_or(Error::ProcessDead)?;
        handle.write_line(line)?;
        let reply = handle.read_line()?;
        decode_response(&reply)
    }

    /// Spend one restart on `cause`, or give up if none are left.
    ///
    /// Returns `cause` so the caller can report what went wrong.
    fn recover(&mut self, cause: Error) -> Error {
        if self.budget.try_consume() {
            tracing::warn!(
                error = %cause,
                restarts = self.budget.used(),
                max_restarts = self.budget.ceiling(),
                "engine interaction failed, restarting"
            );
            if let Err(e) = self.restart() {
                tracing::warn!(error = %e, "engine restart failed");
            }
        } else {
            tracing::warn!(
                error = %cause,
                restarts = self.budget.used(),
                "engine restart budget exhausted, giving up until reconfigured"
            );
            self.terminate_active();
            self.state = SupervisorState::Exhausted;
        }
        cause
    }

    fn restart(&mut self) -> Result<()> {
        self.terminate_active();
        self.spawns += 1;

        match self.launcher.launch() {
            Ok(handle) => {
                self.active = Some(handle);
                self.state = SupervisorState::Running;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start engine");
                self.state = SupervisorState::Dead;
                Err(e)
            }
        }
    }

    fn terminate_active(&mut self) {
        if let Some(mut handle) = self.active.take() {
            if let Err(e) = handle.terminate() {
                tracing::debug!(pid = ?handle.id(), error = %e, "ignoring engine termination error");
            }
        }
    }
}
