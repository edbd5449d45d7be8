//! The `computer` tool: one action per call against an [`InputDriver`].

use std::sync::Arc;
use std::time::Duration;

use osai_core::{ContentPart, ToolDescriptor, ToolKind};
use serde_json::Value;
use tracing::{debug, warn};

use crate::coords::{CoordinateSpace, resolve};
use crate::driver::{InputDriver, MouseButton};
use crate::errors::ToolError;
use crate::keys::{Platform, is_enter, parse_sequence, split_modifiers};
use crate::traits::DesktopTool;

/// Name the model calls this tool by.
pub const TOOL_NAME: &str = "computer";

/// Default computer-use tool version.
pub const DEFAULT_TOOL_TYPE: &str = "computer_20250124";

const MAX_WAIT_SECS: f64 = 10.0;
const DEFAULT_HOLD_SECS: f64 = 0.5;
const DEFAULT_SCROLL_AMOUNT: u64 = 3;
const MAX_SCROLL_AMOUNT: u64 = 50;

/// Punctuation that marks single-line text as code.
const CODE_CHARS: &[char] = &['{', '}', '[', ']', '(', ')', ';', '=', '<', '>'];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Screenshot,
    CursorPosition,
    MouseMove,
    Click(MouseButton, u32),
    Scroll,
    Key,
    HoldKey,
    Type,
    Wait,
}

impl Action {
    fn parse(name: &str) -> Result<Self, ToolError> {
        Ok(match name {
            "screenshot" => Self::Screenshot,
            "cursor_position" => Self::CursorPosition,
            "mouse_move" => Self::MouseMove,
            "left_click" => Self::Click(MouseButton::Left, 1),
            "right_click" => Self::Click(MouseButton::Right, 1),
            "middle_click" => Self::Click(MouseButton::Middle, 1),
            "double_click" => Self::Click(MouseButton::Left, 2),
            "triple_click" => Self::Click(MouseButton::Left, 3),
            "scroll" => Self::Scroll,
            "key" => Self::Key,
            "hold_key" => Self::HoldKey,
            "type" => Self::Type,
            "wait" => Self::Wait,
            other => {
                return Err(ToolError::UnsupportedAction {
                    action: other.to_owned(),
                });
            }
        })
    }
}

/// Whether `text` should be pasted rather than typed.
///
/// Multi-line text, text with tabs, and text carrying two or more code
/// punctuation characters take the clipboard path.
pub fn is_code_like(text: &str) -> bool {
    if text.contains(['\n', '\r', '\t']) {
        return true;
    }
    text.chars().filter(|c| CODE_CHARS.contains(c)).count() >= 2
}

/// The computer-use tool.
pub struct ComputerTool {
    driver: Arc<dyn InputDriver>,
    platform: Platform,
    tool_type: String,
}

impl ComputerTool {
    /// Tool over `driver`, spelling modifiers for `platform`.
    pub fn new(driver: Arc<dyn InputDriver>, platform: Platform) -> Self {
        Self {
            driver,
            platform,
            tool_type: DEFAULT_TOOL_TYPE.to_owned(),
        }
    }

    /// Override the declared tool version.
    #[must_use]
    pub fn with_tool_type(mut self, tool_type: impl Into<String>) -> Self {
        self.tool_type = tool_type.into();
        self
    }

    /// Execute one named action.
    pub fn execute_action(&self, action: &str, params: &Value) -> Result<Vec<ContentPart>, ToolError> {
        debug!(action, "computer action");
        match Action::parse(action)? {
            Action::Screenshot => self.screenshot(),
            Action::CursorPosition => {
                let (x, y) = self.driver.cursor_position()?;
                Ok(vec![ContentPart::text(format!("X={x}, Y={y}"))])
            }
            Action::MouseMove => {
                let (x, y) = self
                    .target(params)?
                    .ok_or_else(|| ToolError::validation("mouse_move requires 'coordinate'"))?;
                self.driver.move_mouse(x, y)?;
                Ok(vec![ContentPart::text(format!("moved to ({x}, {y})"))])
            }
            Action::Click(button, count) => self.click(action, button, count, params),
            Action::Scroll => self.scroll(params),
            Action::Key => self.key(params),
            Action::HoldKey => self.hold_key(params),
            Action::Type => self.type_text(params),
            Action::Wait => {
                let secs = duration_secs(params, 1.0);
                std::thread::sleep(Duration::from_secs_f64(secs));
                Ok(vec![ContentPart::text(format!("waited {secs}s"))])
            }
        }
    }

    fn screenshot(&self) -> Result<Vec<ContentPart>, ToolError> {
        let shot = self.driver.screenshot()?;
        Ok(vec![ContentPart::image(shot.media_type, &shot.bytes)])
    }

    /// Resolve `coordinate` against the screen size right now.
    fn target(&self, params: &Value) -> Result<Option<(i32, i32)>, ToolError> {
        let Some((x, y)) = read_coordinate(params)? else {
            return Ok(None);
        };
        let space = CoordinateSpace::parse(params["coordinate_space"].as_str())?;
        let screen = self.driver.screen_size()?;
        resolve(x, y, space, screen).map(Some)
    }

    fn click(&self, action: &str, button: MouseButton, count: u32, params: &Value) -> Result<Vec<ContentPart>, ToolError> {
        let target = self.target(params)?;
        if let Some((x, y)) = target {
            self.driver.move_mouse(x, y)?;
        }
        self.driver.click(button, count)?;
        let text = match target {
            Some((x, y)) => format!("{action} at ({x}, {y})"),
            None => format!("{action} at cursor"),
        };
        Ok(vec![ContentPart::text(text)])
    }

    fn scroll(&self, params: &Value) -> Result<Vec<ContentPart>, ToolError> {
        if let Some((x, y)) = self.target(params)? {
            self.driver.move_mouse(x, y)?;
        }
        let direction = params["scroll_direction"].as_str().unwrap_or("down");
        let amount = params["scroll_amount"]
            .as_u64()
            .unwrap_or(DEFAULT_SCROLL_AMOUNT)
            .min(MAX_SCROLL_AMOUNT);
        let n = i32::try_from(amount).unwrap_or(0);
        let (dx, dy) = match direction {
            "down" => (0, n),
            "up" => (0, -n),
            "right" => (n, 0),
            "left" => (-n, 0),
            other => {
                return Err(ToolError::validation(format!(
                    "unknown scroll_direction '{other}'"
                )));
            }
        };
        self.driver.scroll(dx, dy)?;
        Ok(vec![ContentPart::text(format!("scrolled {direction} {amount}"))])
    }

    fn key(&self, params: &Value) -> Result<Vec<ContentPart>, ToolError> {
        let spec = key_spec(params, "key")?;
        for chord in parse_sequence(&spec, self.platform)? {
            if is_enter(&chord) {
                self.press_enter()?;
            } else if let [single] = chord.as_slice() {
                self.driver.press(single)?;
            } else {
                let names: Vec<&str> = chord.iter().map(String::as_str).collect();
                self.driver.hotkey(&names)?;
            }
        }
        Ok(vec![ContentPart::text(format!("pressed: {spec}"))])
    }

    /// Enter via the native path when the driver has one, else the generic
    /// press. A native failure is not an error.
    fn press_enter(&self) -> Result<(), ToolError> {
        if let Some(native) = self.driver.native_keys() {
            match native.press_enter() {
                Ok(()) => return Ok(()),
                Err(e) => debug!(error = %e, "native enter failed, using generic press"),
            }
        }
        self.driver.press("enter")?;
        Ok(())
    }

    fn hold_key(&self, params: &Value) -> Result<Vec<ContentPart>, ToolError> {
        let spec = key_spec(params, "hold_key")?;
        let mut chords = parse_sequence(&spec, self.platform)?;
        if chords.len() != 1 {
            return Err(ToolError::validation("hold_key takes a single combo"));
        }
        let chord = chords.remove(0);
        let (modifiers, keys) = split_modifiers(&chord);

        if !modifiers.is_empty() && !keys.is_empty() {
            // modifier-down, key-press, modifier-up; never reordered
            self.with_held(&modifiers, || keys.iter().try_for_each(|k| self.driver.press(k)))?;
        } else {
            let all: Vec<&str> = chord.iter().map(String::as_str).collect();
            let secs = duration_secs(params, DEFAULT_HOLD_SECS);
            self.with_held(&all, || {
                std::thread::sleep(Duration::from_secs_f64(secs));
                Ok(())
            })?;
        }
        Ok(vec![ContentPart::text(format!("held: {spec}"))])
    }

    /// Press `keys` down in order, run `body`, release in reverse order.
    ///
    /// Keys that went down are always released, even when `body` fails.
    fn with_held(
        &self,
        keys: &[&str],
        body: impl FnOnce() -> Result<(), crate::DriverError>,
    ) -> Result<(), ToolError> {
        let mut held = Vec::with_capacity(keys.len());
        let mut outcome = Ok(());
        for key in keys {
            match self.driver.key_down(key) {
                Ok(()) => held.push(*key),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        if outcome.is_ok() {
            outcome = body();
        }
        for key in held.iter().rev() {
            if let Err(e) = self.driver.key_up(key) {
                warn!(key, error = %e, "failed to release key");
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }
        outcome.map_err(ToolError::from)
    }

    fn type_text(&self, params: &Value) -> Result<Vec<ContentPart>, ToolError> {
        let text = params["text"]
            .as_str()
            .ok_or_else(|| ToolError::validation("type action requires 'text'"))?;
        let chars = text.chars().count();
        if text.is_empty() {
            return Ok(vec![ContentPart::text("done: type (0 chars)")]);
        }

        if is_code_like(text) {
            self.driver.set_clipboard(text)?;
            self.driver.hotkey(&[self.platform.primary_modifier(), "v"])?;
            return Ok(vec![ContentPart::text(format!("pasted {chars} chars"))]);
        }

        self.driver.write(text)?;
        Ok(vec![ContentPart::text(format!("done: type ({chars} chars)"))])
    }
}

impl DesktopTool for ComputerTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn descriptor(&self) -> Result<ToolDescriptor, ToolError> {
        let size = self.driver.screen_size()?;
        Ok(ToolDescriptor::new(TOOL_NAME, ToolKind::ComputerUse)
            .with("type", self.tool_type.clone())
            .with("display_width_px", size.width)
            .with("display_height_px", size.height))
    }

    fn execute(&self, input: &Value) -> Result<Vec<ContentPart>, ToolError> {
        let action = input["action"]
            .as_str()
            .ok_or_else(|| ToolError::validation("missing 'action'"))?;
        self.execute_action(action, input)
    }
}

/// Key spec from `text`, `key` or `keys` (string, or array joined with `+`).
fn key_spec(params: &Value, action: &str) -> Result<String, ToolError> {
    let spec = ["text", "key", "keys"].iter().find_map(|field| match &params[*field] {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            parts.map(|p| p.join("+"))
        }
        _ => None,
    });
    match spec {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        _ => Err(ToolError::validation(format!(
            "{action} requires a non-empty 'text', 'key' or 'keys'"
        ))),
    }
}

/// `coordinate: [x, y]`, or top-level `x`/`y`.
fn read_coordinate(params: &Value) -> Result<Option<(f64, f64)>, ToolError> {
    match &params["coordinate"] {
        Value::Null => match (params["x"].as_f64(), params["y"].as_f64()) {
            (Some(x), Some(y)) => Ok(Some((x, y))),
            _ => Ok(None),
        },
        Value::Array(pair) if pair.len() == 2 => match (pair[0].as_f64(), pair[1].as_f64()) {
            (Some(x), Some(y)) => Ok(Some((x, y))),
            _ => Err(ToolError::validation("coordinate values must be numbers")),
        },
        _ => Err(ToolError::validation("coordinate must be [x, y]")),
    }
}

fn duration_secs(params: &Value, default: f64) -> f64 {
    params["duration"]
        .as_f64()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(default)
        .min(MAX_WAIT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{NativeKeys, ScreenSize, Screenshot};
    use crate::errors::DriverError;
    use assert_matches::assert_matches;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Press(String),
        Hotkey(Vec<String>),
        Down(String),
        Up(String),
        Write(String),
        Clipboard(String),
        Move(i32, i32),
        Click(MouseButton, u32),
        Scroll(i32, i32),
        NativeEnter,
    }

    #[derive(Clone, Copy)]
    enum Native {
        Works,
        Fails,
    }

    struct RecordingDriver {
        calls: Mutex<Vec<Call>>,
        size: Mutex<ScreenSize>,
        native: Option<Native>,
        clipboard_fails: bool,
    }

    impl RecordingDriver {
        fn new(native: Option<Native>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                size: Mutex::new(ScreenSize {
                    width: 1440,
                    height: 900,
                }),
                native,
                clipboard_fails: false,
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn record(&self, call: Call) -> Result<(), DriverError> {
            self.calls.lock().push(call);
            Ok(())
        }
    }

    impl NativeKeys for RecordingDriver {
        fn press_enter(&self) -> Result<(), DriverError> {
            match self.native {
                Some(Native::Works) => self.record(Call::NativeEnter),
                _ => Err(DriverError::Input("CGEvent unavailable".into())),
            }
        }
    }

    impl InputDriver for RecordingDriver {
        fn screen_size(&self) -> Result<ScreenSize, DriverError> {
            Ok(*self.size.lock())
        }
        fn cursor_position(&self) -> Result<(i32, i32), DriverError> {
            Ok((10, 20))
        }
        fn move_mouse(&self, x: i32, y: i32) -> Result<(), DriverError> {
            self.record(Call::Move(x, y))
        }
        fn click(&self, button: MouseButton, count: u32) -> Result<(), DriverError> {
            self.record(Call::Click(button, count))
        }
        fn scroll(&self, dx: i32, dy: i32) -> Result<(), DriverError> {
            self.record(Call::Scroll(dx, dy))
        }
        fn press(&self, key: &str) -> Result<(), DriverError> {
            self.record(Call::Press(key.into()))
        }
        fn hotkey(&self, keys: &[&str]) -> Result<(), DriverError> {
            self.record(Call::Hotkey(keys.iter().map(|k| (*k).to_owned()).collect()))
        }
        fn key_down(&self, key: &str) -> Result<(), DriverError> {
            self.record(Call::Down(key.into()))
        }
        fn key_up(&self, key: &str) -> Result<(), DriverError> {
            self.record(Call::Up(key.into()))
        }
        fn write(&self, text: &str) -> Result<(), DriverError> {
            self.record(Call::Write(text.into()))
        }
        fn set_clipboard(&self, text: &str) -> Result<(), DriverError> {
            if self.clipboard_fails {
                return Err(DriverError::Clipboard("pasteboard locked".into()));
            }
            self.record(Call::Clipboard(text.into()))
        }
        fn screenshot(&self) -> Result<Screenshot, DriverError> {
            Ok(Screenshot {
                media_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            })
        }
        fn native_keys(&self) -> Option<&dyn NativeKeys> {
            self.native.map(|_| self as &dyn NativeKeys)
        }
    }

    fn tool(driver: &Arc<RecordingDriver>, platform: Platform) -> ComputerTool {
        ComputerTool::new(driver.clone(), platform)
    }

    fn text_of(parts: &[ContentPart]) -> &str {
        parts[0].as_text().unwrap()
    }

    // ── key ─────────────────────────────────────────────────────────

    #[test]
    fn cmd_space_is_one_hotkey() {
        let driver = RecordingDriver::new(None);
        let out = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "key", "text": "cmd+space"}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![Call::Hotkey(vec!["command".into(), "space".into()])]
        );
        assert!(text_of(&out).contains("pressed"));
    }

    #[test]
    fn cmd_space_on_linux_uses_ctrl() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::Linux)
            .execute(&json!({"action": "key", "key": "cmd+space"}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![Call::Hotkey(vec!["ctrl".into(), "space".into()])]
        );
    }

    #[test]
    fn single_key_is_press() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "key", "keys": "Escape"}))
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::Press("escape".into())]);
    }

    #[test]
    fn key_array_joined_as_combo() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "key", "keys": ["cmd", "c"]}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![Call::Hotkey(vec!["command".into(), "c".into()])]
        );
    }

    #[test]
    fn empty_key_rejected_without_synthesis() {
        let driver = RecordingDriver::new(None);
        let err = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "key", "text": "  "}))
            .unwrap_err();
        assert_matches!(err, ToolError::Validation { .. });
        assert!(driver.calls().is_empty());
    }

    // ── enter ───────────────────────────────────────────────────────

    #[test]
    fn return_return_uses_native_twice() {
        let driver = RecordingDriver::new(Some(Native::Works));
        let _ = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "key", "text": "Return Return"}))
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::NativeEnter, Call::NativeEnter]);
    }

    #[test]
    fn return_return_without_native_presses_enter_twice() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::Linux)
            .execute(&json!({"action": "key", "text": "Return Return"}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![Call::Press("enter".into()), Call::Press("enter".into())]
        );
    }

    #[test]
    fn native_failure_falls_back_to_press() {
        let driver = RecordingDriver::new(Some(Native::Fails));
        let out = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "key", "key": "enter"}))
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::Press("enter".into())]);
        assert!(text_of(&out).contains("pressed"));
    }

    // ── hold_key ────────────────────────────────────────────────────

    #[test]
    fn hold_cmd_k_order() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "hold_key", "text": "cmd+k"}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![
                Call::Down("command".into()),
                Call::Press("k".into()),
                Call::Up("command".into()),
            ]
        );
    }

    #[test]
    fn hold_two_modifiers_released_in_reverse() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::Linux)
            .execute(&json!({"action": "hold_key", "text": "ctrl+shift+t"}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![
                Call::Down("ctrl".into()),
                Call::Down("shift".into()),
                Call::Press("t".into()),
                Call::Up("shift".into()),
                Call::Up("ctrl".into()),
            ]
        );
    }

    #[test]
    fn hold_lone_key_for_duration() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::Linux)
            .execute(&json!({"action": "hold_key", "text": "shift", "duration": 0}))
            .unwrap();
        assert_eq!(
            driver.calls(),
            vec![Call::Down("shift".into()), Call::Up("shift".into())]
        );
    }

    // ── type ────────────────────────────────────────────────────────

    #[test]
    fn single_line_uses_write_only() {
        let driver = RecordingDriver::new(None);
        let out = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "type", "text": "hello world"}))
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::Write("hello world".into())]);
        assert!(text_of(&out).contains("done: type"));
    }

    #[test]
    fn multi_line_pastes_with_platform_modifier() {
        let text = "line1\nline2()";
        for (platform, modifier) in [(Platform::MacOs, "command"), (Platform::Windows, "ctrl")] {
            let driver = RecordingDriver::new(None);
            let out = tool(&driver, platform)
                .execute(&json!({"action": "type", "text": text}))
                .unwrap();
            assert_eq!(
                driver.calls(),
                vec![
                    Call::Clipboard(text.into()),
                    Call::Hotkey(vec![modifier.into(), "v".into()]),
                ]
            );
            assert!(text_of(&out).contains("pasted"));
        }
    }

    #[test]
    fn clipboard_failure_never_falls_back_to_write() {
        let driver = Arc::new(RecordingDriver {
            calls: Mutex::new(Vec::new()),
            size: Mutex::new(ScreenSize {
                width: 100,
                height: 100,
            }),
            native: None,
            clipboard_fails: true,
        });
        let err = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "type", "text": "a\nb"}))
            .unwrap_err();
        assert_matches!(err, ToolError::Driver(DriverError::Clipboard(_)));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn code_like_detection() {
        assert!(is_code_like("fn main() {}"));
        assert!(is_code_like("a\tb"));
        assert!(is_code_like("x = f(y)"));
        assert!(!is_code_like("hello world"));
        assert!(!is_code_like("email me at a@b.com"));
        assert!(!is_code_like("a = b"));
    }

    // ── mouse / screen ──────────────────────────────────────────────

    #[test]
    fn normalized_click_uses_current_screen_size() {
        let driver = RecordingDriver::new(None);
        let t = tool(&driver, Platform::MacOs);
        let input = json!({"action": "left_click", "coordinate": [0.5, 0.5], "coordinate_space": "normalized"});

        let _ = t.execute(&input).unwrap();
        *driver.size.lock() = ScreenSize {
            width: 800,
            height: 600,
        };
        let _ = t.execute(&input).unwrap();

        assert_eq!(
            driver.calls(),
            vec![
                Call::Move(720, 450),
                Call::Click(MouseButton::Left, 1),
                Call::Move(400, 300),
                Call::Click(MouseButton::Left, 1),
            ]
        );
    }

    #[test]
    fn double_click_without_coordinate() {
        let driver = RecordingDriver::new(None);
        let out = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "double_click"}))
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::Click(MouseButton::Left, 2)]);
        assert_eq!(text_of(&out), "double_click at cursor");
    }

    #[test]
    fn mouse_move_requires_coordinate() {
        let driver = RecordingDriver::new(None);
        let err = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "mouse_move"}))
            .unwrap_err();
        assert_matches!(err, ToolError::Validation { .. });
    }

    #[test]
    fn scroll_up() {
        let driver = RecordingDriver::new(None);
        let _ = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "scroll", "scroll_direction": "up", "scroll_amount": 5}))
            .unwrap();
        assert_eq!(driver.calls(), vec![Call::Scroll(0, -5)]);
    }

    #[test]
    fn screenshot_returns_png_image() {
        let driver = RecordingDriver::new(None);
        let out = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "screenshot"}))
            .unwrap();
        assert_matches!(&out[0], ContentPart::Image { media_type, .. } if media_type == "image/png");
    }

    #[test]
    fn cursor_position_text() {
        let driver = RecordingDriver::new(None);
        let out = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "cursor_position"}))
            .unwrap();
        assert_eq!(text_of(&out), "X=10, Y=20");
    }

    // ── dispatch surface ────────────────────────────────────────────

    #[test]
    fn descriptor_reflects_live_size() {
        let driver = RecordingDriver::new(None);
        let t = tool(&driver, Platform::MacOs);
        let d = t.descriptor().unwrap();
        assert_eq!(d.name, "computer");
        assert_eq!(d.kind, ToolKind::ComputerUse);
        assert_eq!(d.config["type"], DEFAULT_TOOL_TYPE);
        assert_eq!(d.config["display_width_px"], 1440);
        *driver.size.lock() = ScreenSize {
            width: 1920,
            height: 1080,
        };
        assert_eq!(t.descriptor().unwrap().config["display_height_px"], 1080);
    }

    #[test]
    fn unknown_action_rejected() {
        let driver = RecordingDriver::new(None);
        let err = tool(&driver, Platform::MacOs)
            .execute(&json!({"action": "teleport"}))
            .unwrap_err();
        assert_matches!(err, ToolError::UnsupportedAction { ref action } if action == "teleport");
    }

    #[test]
    fn missing_action_rejected() {
        let driver = RecordingDriver::new(None);
        assert!(tool(&driver, Platform::MacOs).execute(&json!({})).is_err());
    }
}
