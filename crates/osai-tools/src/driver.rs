//! OS input/output primitives the computer tool is built on.
//!
//! All methods are synchronous and may block; callers run them on a
//! blocking worker.

use crate::errors::DriverError;

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

/// Logical display size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A captured display image.
#[derive(Clone, Debug)]
pub struct Screenshot {
    /// MIME type of `bytes`.
    pub media_type: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Low-level key synthesis that bypasses the generic key-press primitive.
///
/// Exposed by drivers whose generic path is unreliable for some keys.
pub trait NativeKeys: Send + Sync {
    /// Synthesize Enter/Return via the platform key code.
    fn press_enter(&self) -> Result<(), DriverError>;
}

/// Synchronous OS primitives.
///
/// Key names passed in are already canonical (see [`crate::keys`]).
pub trait InputDriver: Send + Sync {
    /// Current display size. Queried on every call that needs it.
    fn screen_size(&self) -> Result<ScreenSize, DriverError>;
    /// Current cursor position.
    fn cursor_position(&self) -> Result<(i32, i32), DriverError>;
    /// Move the cursor to absolute screen coordinates.
    fn move_mouse(&self, x: i32, y: i32) -> Result<(), DriverError>;
    /// Click `count` times at the current cursor position.
    fn click(&self, button: MouseButton, count: u32) -> Result<(), DriverError>;
    /// Scroll by wheel notches; positive `dy` scrolls down, positive `dx` right.
    fn scroll(&self, dx: i32, dy: i32) -> Result<(), DriverError>;
    /// Press and release one key.
    fn press(&self, key: &str) -> Result<(), DriverError>;
    /// Press all keys in order, release in reverse.
    fn hotkey(&self, keys: &[&str]) -> Result<(), DriverError>;
    /// Press a key without releasing it.
    fn key_down(&self, key: &str) -> Result<(), DriverError>;
    /// Release a key.
    fn key_up(&self, key: &str) -> Result<(), DriverError>;
    /// Inject text directly as characters.
    fn write(&self, text: &str) -> Result<(), DriverError>;
    /// Replace the clipboard contents with `text`.
    fn set_clipboard(&self, text: &str) -> Result<(), DriverError>;
    /// Capture the primary display.
    fn screenshot(&self) -> Result<Screenshot, DriverError>;

    /// Optional low-level key path; `None` when this driver has none.
    fn native_keys(&self) -> Option<&dyn NativeKeys> {
        None
    }
}

/// Driver for hosts without a desktop backend.
///
/// Reports a fixed screen size so tool descriptors can still be built; every
/// action fails with [`DriverError::Unavailable`].
pub struct UnavailableDriver {
    size: ScreenSize,
    reason: String,
}

impl UnavailableDriver {
    /// Create with the screen size to advertise and the reason to report.
    pub fn new(size: ScreenSize, reason: impl Into<String>) -> Self {
        Self {
            size,
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, DriverError> {
        Err(DriverError::Unavailable(self.reason.clone()))
    }
}

impl InputDriver for UnavailableDriver {
    fn screen_size(&self) -> Result<ScreenSize, DriverError> {
        Ok(self.size)
    }
    fn cursor_position(&self) -> Result<(i32, i32), DriverError> {
        self.fail()
    }
    fn move_mouse(&self, _x: i32, _y: i32) -> Result<(), DriverError> {
        self.fail()
    }
    fn click(&self, _button: MouseButton, _count: u32) -> Result<(), DriverError> {
        self.fail()
    }
    fn scroll(&self, _dx: i32, _dy: i32) -> Result<(), DriverError> {
        self.fail()
    }
    fn press(&self, _key: &str) -> Result<(), DriverError> {
        self.fail()
    }
    fn hotkey(&self, _keys: &[&str]) -> Result<(), DriverError> {
        self.fail()
    }
    fn key_down(&self, _key: &str) -> Result<(), DriverError> {
        self.fail()
    }
    fn key_up(&self, _key: &str) -> Result<(), DriverError> {
        self.fail()
    }
    fn write(&self, _text: &str) -> Result<(), DriverError> {
        self.fail()
    }
    fn set_clipboard(&self, _text: &str) -> Result<(), DriverError> {
        self.fail()
    }
    fn screenshot(&self) -> Result<Screenshot, DriverError> {
        self.fail()
    }
}
