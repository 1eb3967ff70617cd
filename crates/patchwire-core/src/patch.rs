//! Patch metadata — the currently loaded program.
//!
//! Immutable from the client's perspective; the server replaces it wholesale
//! via a `get_patch` push.

use serde::{Deserialize, Serialize};

/// Patch category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchCategory {
    /// Generates video.
    #[default]
    Source,
    /// Transforms video.
    Effect,
    /// Combines video streams.
    Mixer,
}

/// Video dimensions of the patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Author credits for the patch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchCredits {
    /// Author name.
    #[serde(default)]
    pub author: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Homepage URL.
    #[serde(default)]
    pub url: String,
}

/// Licensing information for the patch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLicense {
    /// License name.
    #[serde(default)]
    pub name: String,
    /// License file reference.
    #[serde(default)]
    pub file: String,
}

/// Metadata about the currently loaded program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
    /// Patch category.
    #[serde(default)]
    pub category: PatchCategory,
    /// Video dimensions.
    #[serde(default)]
    pub video: PatchDimensions,
    /// Author credits.
    #[serde(default)]
    pub credits: PatchCredits,
    /// Licensing information.
    #[serde(default)]
    pub license: PatchLicense,
    /// Stable identifier.
    #[serde(default)]
    pub identifier: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
