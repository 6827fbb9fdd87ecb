//! Semantic version values that tag and order migration steps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};

/// A `MAJOR.MINOR.PATCH` version.
///
/// The derived `Ord` compares `(major, minor, patch)` lexicographically,
/// which is the total order the engine executes steps in. Versions with
/// equal components are equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `"MAJOR.MINOR.PATCH"` string.
    ///
    /// Each component must be a non-empty run of ASCII digits; anything
    /// else fails with [`MigrateError::InvalidFormat`].
    pub fn parse(s: &str) -> MigrateResult<Self> {
        s.parse()
    }
}

impl FromStr for Version {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(MigrateError::InvalidFormat(s.to_string()));
        }

        let mut components = [0u64; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MigrateError::InvalidFormat(s.to_string()));
            }
            *slot = part
                .parse()
                .map_err(|_| MigrateError::InvalidFormat(s.to_string()))?;
        }

        Ok(Self::new(components[0], components[1], components[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
