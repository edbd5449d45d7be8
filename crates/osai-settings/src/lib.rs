//! # osai-settings
//!
//! Configuration for the OS-AI agent backend, loaded from three layers (in
//! priority order):
//!
//! 1. **Compiled defaults** - [`Settings::default()`]
//! 2. **User file** - `~/.os-ai/settings.json` (or `OS_AI_SETTINGS`), deep-merged over defaults
//! 3. **Environment variables** - `OS_AI_*` overrides (highest priority)
//!
//! The provider credential is not part of [`Settings`]; see
//! [`process_credential`] for the process-level fallback.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, process_credential, settings_path};
pub use types::*;
