//! Version directory names.

use std::cmp::Ordering;
use std::fmt;

/// A version directory name parsed as a dotted list of integers.
///
/// Names that do not parse keep an empty component list, so they compare
/// lower than every parseable version and resolution can carry on. A
/// component wider than `u128` counts as unparsable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    name: String,
    parts: Vec<u128>,
}

impl EngineVersion {
    /// Parse a directory name like `"4.4.223"`.
    pub fn parse(name: &str) -> Self {
        let parts = name
            .split('.')
            .map(|part| part.parse::<u128>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            parts,
        }
    }

    /// The directory name as found on disk.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric components; empty when the name did not parse.
    pub fn parts(&self) -> &[u128] {
        &self.parts
    }

    pub fn is_valid(&self) -> bool {
        !self.parts.is_empty()
    }
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
