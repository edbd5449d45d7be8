//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate cross-field constraints
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::Settings;

/// Env var naming an explicit settings file.
pub const SETTINGS_PATH_ENV: &str = "OS_AI_SETTINGS";

/// Env var holding the process-level provider credential.
pub const CREDENTIAL_ENV: &str = "ANTHROPIC_API_KEY";

/// Resolve the settings file path: `OS_AI_SETTINGS`, else `~/.os-ai/settings.json`.
pub fn settings_path() -> PathBuf {
    if let Some(explicit) = read_env_string(SETTINGS_PATH_ENV) {
        return PathBuf::from(explicit);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".os-ai").join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let mut settings = merge_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn merge_file(path: &Path) -> Result<Settings> {
    let defaults = serde_json::to_value(Settings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// The process-level credential fallback, if set and non-blank.
///
/// Only consulted when a connection supplies no credential of its own.
pub fn process_credential() -> Option<String> {
    read_env_string(CREDENTIAL_ENV).filter(|v| !v.trim().is_empty())
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let checked = |name: &str, parsed: Option<u64>, raw: &str| {
        if parsed.is_none() {
            warn!(key = name, value = %raw, "invalid numeric env var, ignoring");
        }
        parsed
    };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = string("OS_AI_BACKEND_HOST") {
        settings.server.host = v;
    }
    if let Some(raw) = string("OS_AI_BACKEND_PORT") {
        if let Some(v) = checked("OS_AI_BACKEND_PORT", parse_u64_range(&raw, 1, 65_535), &raw) {
            settings.server.port = u16::try_from(v).unwrap_or(settings.server.port);
        }
    }

    // ── Agent ───────────────────────────────────────────────────────
    if let Some(raw) = string("OS_AI_MAX_ITERATIONS") {
        let limit = u64::from(settings.agent.max_iterations_limit);
        if let Some(v) = checked("OS_AI_MAX_ITERATIONS", parse_u64_range(&raw, 1, limit), &raw) {
            settings.agent.default_max_iterations =
                u32::try_from(v).unwrap_or(settings.agent.default_max_iterations);
        }
    }
    if let Some(raw) = string("OS_AI_SESSION_TIMEOUT_MS") {
        if let Some(v) = checked(
            "OS_AI_SESSION_TIMEOUT_MS",
            parse_u64_range(&raw, 100, 600_000),
            &raw,
        ) {
            settings.agent.session_ready_timeout_ms = v;
        }
    }

    // ── Provider ────────────────────────────────────────────────────
    if let Some(v) = string("OS_AI_MODEL") {
        settings.provider.model = v;
    }
    if let Some(v) = string("OS_AI_PROVIDER") {
        settings.provider.default_provider = v;
    }
    if let Some(v) = string("OS_AI_API_BASE_URL") {
        settings.provider.base_url = v;
    }

    // ── Logging / attachments ───────────────────────────────────────
    if let Some(v) = string("OS_AI_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(raw) = string("OS_AI_LOG_JSON") {
        match parse_bool(&raw) {
            Some(v) => settings.logging.json = v,
            None => warn!(key = "OS_AI_LOG_JSON", value = %raw, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = string("OS_AI_UPLOAD_DIR") {
        settings.attachments.upload_dir = Some(v);
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
