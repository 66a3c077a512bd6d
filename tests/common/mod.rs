//! Test utilities for libtabnine integration tests.
//!
//! Mock engines are small `/bin/sh` scripts written into a temporary
//! directory. They speak the same one-line-in, one-line-out protocol as the
//! real engine.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use libtabnine::binary::PlatformKey;
use libtabnine::EngineConfig;
use tempfile::TempDir;

/// Replies to every request with the request line itself.
pub const ECHO_ENGINE: &str = r#"while IFS= read -r line; do
    printf '%s\n' "$line"
done
"#;

/// Replies to every request with a line that is not JSON.
pub const GARBAGE_ENGINE: &str = r#"while IFS= read -r line; do
    echo "engine panicked"
done
"#;

/// Answers one request, then exits.
pub const CRASH_AFTER_ONE_ENGINE: &str = r#"IFS= read -r line
printf '%s\n' "$line"
exit 0
"#;

/// Replies on stderr instead of stdout.
pub const STDERR_ENGINE: &str = r#"while IFS= read -r line; do
    printf '%s\n' "$line" >&2
done
"#;

/// Reads requests but never answers.
pub const SILENT_ENGINE: &str = r#"while IFS= read -r line; do
    :
done
"#;

/// A temporary directory holding mock engines.
pub struct MockEngines {
    dir: TempDir,
}

impl MockEngines {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an executable script named `name` with the given body.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        write_script(&path, body);
        path
    }

    /// Echo engine that first records its arguments, one per line, in `args_file`.
    pub fn recording_script(&self, name: &str, args_file: &Path) -> PathBuf {
        let body = format!(
            "printf '%s\\n' \"$@\" > '{}'\n{}",
            args_file.display(),
            ECHO_ENGINE
        );
        self.script(name, &body)
    }

    /// Install a script at `<root>/<version>/<platform path>` for the current platform.
    ///
    /// Returns `None` on platforms without a known layout.
    pub fn install(&self, root: &Path, version: &str, body: &str) -> Option<PathBuf> {
        let relative = PlatformKey::current().ok()?.relative_path().ok()?;
        let path = root.join(version).join(relative);
        fs::create_dir_all(path.parent()?).expect("create version dir");
        write_script(&path, body);
        Some(path)
    }
}

/// Config that runs `binary` directly.
pub fn config_for(binary: &Path) -> EngineConfig {
    EngineConfig::builder()
        .binary_path(binary)
        .client_version("test")
        .plugin_version("0.0.0")
        .build()
        .expect("valid config")
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}")).expect("write mock engine");
    let mut perms = fs::metadata(path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("set script permissions");
}
