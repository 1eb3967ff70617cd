//! Product information — the static server identity.
//!
//! Fetched once per successful connection over plain HTTP; not part of the
//! push protocol.

use serde::{Deserialize, Serialize};

/// Static server identity and version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Major version.
    #[serde(default)]
    pub major: u32,
    /// Minor version.
    #[serde(default)]
    pub minor: u32,
    /// Micro version.
    #[serde(default)]
    pub micro: u32,
    /// Build revision.
    #[serde(default)]
    pub revision: u32,
}

impl Product {
    /// Human-readable `major.minor.micro` version string.
    #[must_use]
    pub fn version(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.micro)
    }
}
