//! Process spawning and lifecycle management.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

use super::io::{ProcessReader, ProcessWriter};
use super::{EngineHandle, Launcher};
use crate::binary::{self, PlatformKey};
use crate::config::EngineConfig;
use crate::{Error, Result};

/// Suppresses the console window the engine would otherwise open on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A running engine process.
///
/// Stdin and stdout are pipes; stderr is merged into the stdout line stream.
///
/// Dropping an `EngineProcess` kills the subprocess if it's still running.
pub struct EngineProcess {
    child: Child,
    writer: ProcessWriter,
    reader: ProcessReader,
}

impl EngineProcess {
    /// Spawn the engine at `binary` with the arguments derived from `config`.
    pub fn spawn(config: &EngineConfig, binary: &Path) -> Result<Self> {
        let mut cmd = build_command(config, binary, &[]);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| Error::ProcessSpawn {
            path: binary.to_path_buf(),
            source,
        })?;

        let (stdin, stdout, stderr) = match (
            child.stdin.take(),
            child.stdout.take(),
            child.stderr.take(),
        ) {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::ProcessSpawn {
                    path: binary.to_path_buf(),
                    source: std::io::Error::other("engine stdio was not captured"),
                });
            }
        };

        let reader = ProcessReader::spawn(
            [
                Box::new(stdout) as Box<dyn std::io::Read + Send>,
                Box::new(stderr) as Box<dyn std::io::Read + Send>,
            ],
            config.read_timeout,
        );

        tracing::info!(pid = child.id(), path = %binary.display(), "started engine");

        Ok(Self {
            child,
            writer: ProcessWriter::new(stdin),
            reader,
        })
    }
}

impl EngineHandle for EngineProcess {
    fn id(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                tracing::warn!(pid = self.child.id(), %status, "engine exited");
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(pid = self.child.id(), error = %e, "cannot poll engine status");
                true
            }
        }
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_line(line)
    }

    fn read_line(&mut self) -> Result<Vec<u8>> {
        self.reader.read_line()
    }

    fn terminate(&mut self) -> Result<()> {
        self.child.kill().map_err(Error::io)?;
        self.child.wait().map_err(Error::io)?;
        Ok(())
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.terminate();
        }
    }
}

/// Launches engine processes from an [`EngineConfig`].
///
/// The binary is resolved on every launch so that a freshly installed version
/// is picked up by the next restart.
#[derive(Debug, Clone)]
pub struct EngineLauncher {
    config: Arc<EngineConfig>,
}

impl EngineLauncher {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get a reference to the underlying config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The binary the next launch would start.
    ///
    /// The explicit override wins; otherwise the highest matching version
    /// under the binaries directory for the current platform.
    pub fn binary_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.config.binary_path {
            return Ok(path.clone());
        }
        match self.config.binaries_dir {
            Some(ref root) => binary::resolve(root, PlatformKey::current()?),
            None => Err(Error::InvalidConfig(
                "either binaries_dir or binary_path must be set".into(),
            )),
        }
    }

    /// Start the engine attached to the caller's terminal.
    ///
    /// `args` are inserted right after `--client <id>`. Nothing is piped, so
    /// the returned child is not usable with the supervisor.
    pub fn run_inherited(&self, args: &[String]) -> Result<Child> {
        let binary = self.binary_path()?;
        let mut cmd = build_command(&self.config, &binary, args);
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        cmd.spawn().map_err(|source| Error::ProcessSpawn {
            path: binary,
            source,
        })
    }
}

impl Launcher for EngineLauncher {
    type Handle = EngineProcess;

    fn launch(&mut self) -> Result<EngineProcess> {
        let binary = self.binary_path()?;
        EngineProcess::spawn(&self.config, &binary)
    }
}

/// Build a Command from the config.
fn build_command(config: &EngineConfig, binary: &Path, additional_args: &[String]) -> Command {
    let mut cmd = Command::new(binary);
    cmd.args(build_args(config, additional_args));

    for (key, value) in &config.env_vars {
        cmd.env(key, value);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

/// Build engine arguments.
///
/// `--client <id> [additional] [--log-file-path <path>] [extra] --client-metadata ...`
fn build_args(config: &EngineConfig, additional_args: &[String]) -> Vec<String> {
    let mut args = vec!["--client".to_string(), config.metadata.client.clone()];
    args.extend(additional_args.iter().cloned());

    if let Some(ref path) = config.log_file_path {
        args.push("--log-file-path".to_string());
        args.push(path.display().to_string());
    }

    args.extend(config.extra_args.iter().cloned());
    args.extend(config.metadata.to_args());

    args
}
