//! Key names, modifier aliases and chord parsing.
//!
//! Models send key specs like `cmd+space`, `Return Return` or `ctrl+shift+t`.
//! Whitespace separates chords that are pressed one after another; `+` joins
//! the keys of one chord. Every name is mapped to the canonical spelling the
//! driver understands before anything is synthesized.

use crate::errors::ToolError;

/// Host platform, which decides modifier spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Linux and other Unix desktops.
    Linux,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Modifier used for shortcuts such as copy and paste.
    pub fn primary_modifier(self) -> &'static str {
        match self {
            Self::MacOs => "command",
            Self::Windows | Self::Linux => "ctrl",
        }
    }

    /// The OS ("logo") modifier.
    pub fn meta_modifier(self) -> &'static str {
        match self {
            Self::MacOs => "command",
            Self::Windows => "win",
            Self::Linux => "super",
        }
    }
}

/// Canonical modifier names accepted by drivers.
const MODIFIERS: &[&str] = &["command", "ctrl", "alt", "shift", "win", "super", "fn"];

/// Whether `canonical` names a modifier key.
pub fn is_modifier(canonical: &str) -> bool {
    MODIFIERS.contains(&canonical)
}

/// Map one key name to its canonical spelling for `platform`.
///
/// Multi-character names are case-insensitive. Single characters keep their
/// case, so `A` still means shifted `a` to drivers that care.
pub fn canonical_key(name: &str, platform: Platform) -> String {
    if name.chars().count() == 1 {
        return name.to_owned();
    }
    let lower = name.to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "cmd" | "command" => platform.primary_modifier(),
        "meta" | "super" | "win" | "windows" => platform.meta_modifier(),
        "ctrl" | "control" | "ctl" => "ctrl",
        "alt" | "option" | "opt" => "alt",
        "shift" => "shift",
        "return" | "enter" | "kp_enter" => "enter",
        "esc" | "escape" => "escape",
        "del" | "delete" => "delete",
        "backspace" | "back_space" => "backspace",
        "space" | "spacebar" => "space",
        "tab" => "tab",
        "pgup" | "page_up" | "pageup" | "prior" => "pageup",
        "pgdn" | "page_down" | "pagedown" | "next" => "pagedown",
        "up" | "arrowup" | "arrow_up" => "up",
        "down" | "arrowdown" | "arrow_down" => "down",
        "left" | "arrowleft" | "arrow_left" => "left",
        "right" | "arrowright" | "arrow_right" => "right",
        "capslock" | "caps_lock" => "capslock",
        _ => return lower,
    };
    canonical.to_owned()
}

/// Parse one `+`-joined chord into canonical key names.
///
/// Rejects empty components (`cmd+`, `+`), which would otherwise reach the
/// driver as an empty key.
pub fn parse_chord(chord: &str, platform: Platform) -> Result<Vec<String>, ToolError> {
    // A bare "+" means the plus key itself.
    if chord == "+" {
        return Ok(vec!["+".to_owned()]);
    }
    chord
        .split('+')
        .map(|part| {
            let part = part.trim();
            if part.is_empty() {
                Err(ToolError::validation(format!("empty key in combo '{chord}'")))
            } else {
                Ok(canonical_key(part, platform))
            }
        })
        .collect()
}

/// Parse a whitespace-separated sequence of chords.
pub fn parse_sequence(spec: &str, platform: Platform) -> Result<Vec<Vec<String>>, ToolError> {
    let chords: Vec<Vec<String>> = spec
        .split_whitespace()
        .map(|chord| parse_chord(chord, platform))
        .collect::<Result<_, _>>()?;
    if chords.is_empty() {
        return Err(ToolError::validation("key combo is empty"));
    }
    Ok(chords)
}

/// Whether a chord is exactly the Enter key.
pub fn is_enter(chord: &[String]) -> bool {
    chord.len() == 1 && chord[0] == "enter"
}

/// Split a chord into (modifiers, non-modifier keys), preserving order.
pub fn split_modifiers(chord: &[String]) -> (Vec<&str>, Vec<&str>) {
    chord
        .iter()
        .map(String::as_str)
        .partition(|k| is_modifier(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn cmd_maps_per_platform() {
        assert_eq!(canonical_key("cmd", Platform::MacOs), "command");
        assert_eq!(canonical_key("CMD", Platform::Linux), "ctrl");
        assert_eq!(canonical_key("command", Platform::Windows), "ctrl");
    }

    #[test]
    fn meta_maps_per_platform() {
        assert_eq!(canonical_key("super", Platform::MacOs), "command");
        assert_eq!(canonical_key("meta", Platform::Windows), "win");
        assert_eq!(canonical_key("win", Platform::Linux), "super");
    }

    #[test]
    fn aliases() {
        let p = Platform::MacOs;
        assert_eq!(canonical_key("Return", p), "enter");
        assert_eq!(canonical_key("control", p), "ctrl");
        assert_eq!(canonical_key("option", p), "alt");
        assert_eq!(canonical_key("Page_Down", p), "pagedown");
        assert_eq!(canonical_key("F5", p), "f5");
    }

    #[test]
    fn single_char_keeps_case() {
        assert_eq!(canonical_key("K", Platform::MacOs), "K");
        assert_eq!(canonical_key("k", Platform::MacOs), "k");
    }

    #[test]
    fn chord_cmd_space() {
        let chord = parse_chord("cmd+space", Platform::MacOs).unwrap();
        assert_eq!(chord, vec!["command", "space"]);
    }

    #[test]
    fn chord_with_empty_part_rejected() {
        assert_matches!(
            parse_chord("cmd+", Platform::MacOs),
            Err(ToolError::Validation { .. })
        );
    }

    #[test]
    fn bare_plus_is_plus_key() {
        assert_eq!(parse_chord("+", Platform::Linux).unwrap(), vec!["+"]);
    }

    #[test]
    fn sequence_splits_on_whitespace() {
        let seq = parse_sequence("Return  Return", Platform::MacOs).unwrap();
        assert_eq!(seq.len(), 2);
        assert!(seq.iter().all(|c| is_enter(c)));
    }

    #[test]
    fn blank_sequence_rejected() {
        assert!(parse_sequence("   ", Platform::Linux).is_err());
    }

    #[test]
    fn split_modifiers_keeps_order() {
        let chord = parse_chord("ctrl+shift+t", Platform::Linux).unwrap();
        let (mods, keys) = split_modifiers(&chord);
        assert_eq!(mods, vec!["ctrl", "shift"]);
        assert_eq!(keys, vec!["t"]);
    }

    #[test]
    fn primary_modifier() {
        assert_eq!(Platform::MacOs.primary_modifier(), "command");
        assert_eq!(Platform::Windows.primary_modifier(), "ctrl");
    }
}
