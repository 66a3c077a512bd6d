use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur when talking to the TabNine engine.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Resolution and spawn errors: failed to find or start the engine
/// - Interaction errors: the engine died, an I/O call failed or the reply was not JSON
/// - Supervisor errors: the restart budget is spent
///
/// Most callers never see these: the supervisor logs them and hands back `None`.
/// They are returned by the `try_*` entry points for hosts that want the reason.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors
    // -------------------------------------------------------------------------
    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A request builder was given inconsistent inputs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // -------------------------------------------------------------------------
    // Resolution and spawn errors
    // -------------------------------------------------------------------------
    /// No engine binary is published for this OS/architecture pair.
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// No version directory under the root contains a binary for this platform.
    #[error("no engine binary found under {}", root.display())]
    BinaryNotFound { root: PathBuf },

    /// Failed to spawn the engine subprocess.
    #[error("failed to spawn engine at {}: {source}", path.display())]
    ProcessSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Interaction errors
    // -------------------------------------------------------------------------
    /// The engine process has exited.
    #[error("engine process is dead")]
    ProcessDead,

    /// IO error communicating with the engine subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    /// The engine replied with bytes that are not UTF-8.
    #[error("response is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// Failed to parse JSON from engine output.
    #[error("failed to parse JSON: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The engine closed its output before replying.
    #[error("engine output closed unexpectedly")]
    StreamClosed,

    /// No reply line arrived within the configured read timeout.
    #[error("engine did not reply within {0:?}")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Supervisor errors
    // -------------------------------------------------------------------------
    /// Automatic restarts are used up until the next reconfiguration.
    #[error("restart budget exhausted after {restarts} restarts")]
    BudgetExhausted { restarts: u32 },
}

/// A specialized Result type for libtabnine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a JSON parse error with context.
    pub fn json_parse(source: serde_json::Error, raw: &str) -> Self {
        Self::JsonParse {
            message: format!(
                "at line {} column {}: {}",
                source.line(),
                source.column(),
                raw.chars().take(100).collect::<String>()
            ),
            source,
        }
    }

    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Check if the engine replied with something that could not be decoded.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Error::InvalidUtf8(_) | Error::JsonParse { .. })
    }

    /// Check if this error means the active engine can no longer be trusted.
    ///
    /// Covers every error a write/read/decode exchange can produce.
    pub fn is_interaction_failure(&self) -> bool {
        matches!(
            self,
            Error::ProcessDead
                | Error::Io(_)
                | Error::InvalidUtf8(_)
                | Error::JsonParse { .. }
                | Error::StreamClosed
                | Error::Timeout(_)
        )
    }

    /// Check if this error happened while locating or starting the engine.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedPlatform { .. }
                | Error::BinaryNotFound { .. }
                | Error::ProcessSpawn { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonParse {
            message: err.to_string(),
            source: err,
        }
    }
}
