//! # patchwire-settings
//!
//! Configuration loading for the patchwire client.
//!
//! Settings come from three layers, lowest to highest priority:
//! compiled defaults, `~/.patchwire/settings.json` (deep-merged), and
//! environment variable overrides.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, load_settings, load_settings_from_path, settings_path};
pub use types::{ConnectionSettings, LoggingSettings, PatchwireSettings};
