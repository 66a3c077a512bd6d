//! Locating the engine binary.
//!
//! Engine builds are unpacked side by side, one directory per version:
//!
//! ```text
//! binaries/
//! ├── 4.4.223/
//! │   ├── x86_64-unknown-linux-musl/TabNine
//! │   └── x86_64-apple-darwin/TabNine
//! └── 4.5.0/
//!     └── x86_64-pc-windows-gnu/TabNine.exe
//! ```
//!
//! [`resolve`] picks the highest version that actually ships a build for the
//! current [`PlatformKey`] and makes sure it is executable.

mod platform;
mod version;

use std::path::{Path, PathBuf};

pub use platform::{Arch, Os, PlatformKey};
pub use version::EngineVersion;

use crate::{Error, Result};

/// Find the engine binary for `platform` under `root`.
///
/// Version directories are tried from highest to lowest; the first one that
/// contains a regular file at the platform's relative path wins. A lower
/// version with a matching build beats a higher version without one.
///
/// # Errors
///
/// - [`Error::UnsupportedPlatform`] if the platform has no table entry
/// - [`Error::BinaryNotFound`] if the root is missing or no version matches
/// - [`Error::Io`] if the root cannot be listed or permissions cannot be set
pub fn resolve(root: &Path, platform: PlatformKey) -> Result<PathBuf> {
    let relative = platform.relative_path()?;

    for version in list_versions(root)? {
        let candidate = root.join(version.name()).join(relative);
        if candidate.is_file() {
            ensure_executable(&candidate)?;
            tracing::info!(%version, path = %candidate.display(), "selected engine version");
            return Ok(candidate);
        }
        tracing::debug!(%version, %platform, "version has no build for this platform");
    }

    Err(Error::BinaryNotFound {
        root: root.to_path_buf(),
    })
}

/// Immediate sub-directories of `root`, highest version first.
pub fn list_versions(root: &Path) -> Result<Vec<EngineVersion>> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::BinaryNotFound {
                root: root.to_path_buf(),
            }
        } else {
            Error::io(e)
        }
    })?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(Error::io)?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            versions.push(EngineVersion::parse(name));
        }
    }

    versions.sort_by(|a, b| b.cmp(a));
    Ok(versions)
}

/// Set the owner execute bit on `path` unless it is already set.
///
/// Archives do not always preserve permissions.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path).map_err(Error::io)?.permissions();
    let mode = perms.mode();
    let new_mode = mode | 0o100;
    if new_mode != mode {
        perms.set_mode(new_mode);
        std::fs::set_permissions(path, perms).map_err(Error::io)?;
        tracing::debug!(path = %path.display(), "added execute permission");
    }
    Ok(())
}

/// Set the owner execute bit on `path` unless it is already set.
#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> Result<()> {
    Ok(())
}
