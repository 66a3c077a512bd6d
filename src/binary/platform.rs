//! Operating system / architecture detection and the binary path table.

use std::fmt;

use crate::{Error, Result};

/// Operating systems the engine is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
}

impl Os {
    /// Map a `std::env::consts::OS` value.
    pub fn from_std(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Os::Linux),
            "macos" => Some(Os::MacOs),
            "windows" => Some(Os::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Linux => write!(f, "linux"),
            Os::MacOs => write!(f, "macos"),
            Os::Windows => write!(f, "windows"),
        }
    }
}

/// CPU architectures the engine is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Aarch64,
}

impl Arch {
    /// Map a `std::env::consts::ARCH` value.
    pub fn from_std(arch: &str) -> Option<Self> {
        match arch {
            "x86" => Some(Arch::X86),
            "x86_64" => Some(Arch::X86_64),
            "aarch64" => Some(Arch::Aarch64),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86 => write!(f, "x86"),
            Arch::X86_64 => write!(f, "x86_64"),
            Arch::Aarch64 => write!(f, "aarch64"),
        }
    }
}

/// Relative binary path inside a version directory, per platform.
const BINARY_PATHS: &[(Os, Arch, &str)] = &[
    (Os::Linux, Arch::X86, "i686-unknown-linux-musl/TabNine"),
    (Os::Linux, Arch::X86_64, "x86_64-unknown-linux-musl/TabNine"),
    (Os::Linux, Arch::Aarch64, "aarch64-unknown-linux-musl/TabNine"),
    (Os::MacOs, Arch::X86, "i686-apple-darwin/TabNine"),
    (Os::MacOs, Arch::X86_64, "x86_64-apple-darwin/TabNine"),
    (Os::MacOs, Arch::Aarch64, "aarch64-apple-darwin/TabNine"),
    (Os::Windows, Arch::X86, "i686-pc-windows-gnu/TabNine.exe"),
    (Os::Windows, Arch::X86_64, "x86_64-pc-windows-gnu/TabNine.exe"),
];

/// The (OS, architecture) pair used to pick an engine build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this process runs on.
    pub fn current() -> Result<Self> {
        Self::from_std(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a key from `std::env::consts`-style strings.
    pub fn from_std(os: &str, arch: &str) -> Result<Self> {
        match (Os::from_std(os), Arch::from_std(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(Error::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// Path of the engine executable relative to a version directory.
    pub fn relative_path(&self) -> Result<&'static str> {
        BINARY_PATHS
            .iter()
            .find(|(os, arch, _)| *os == self.os && *arch == self.arch)
            .map(|(_, _, path)| *path)
            .ok_or_else(|| Error::UnsupportedPlatform {
                os: self.os.to_string(),
                arch: self.arch.to_string(),
            })
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
