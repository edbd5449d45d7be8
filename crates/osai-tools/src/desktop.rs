//! Desktop driver over enigo (input), arboard (clipboard) and xcap (capture).

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use tracing::debug;
use xcap::image::{ImageFormat, imageops};

use crate::driver::{InputDriver, MouseButton, NativeKeys, ScreenSize, Screenshot};
use crate::errors::DriverError;

/// macOS virtual key code for Return.
const MAC_RETURN_KEYCODE: u16 = 36;

type ClipboardJob = (String, mpsc::Sender<Result<(), DriverError>>);

/// [`InputDriver`] for a real desktop session.
///
/// An enigo handle is opened per call so no platform handle is shared across
/// blocking workers. The clipboard lives on its own thread because some
/// platforms drop the contents when the owning handle goes away.
pub struct DesktopDriver {
    clipboard: mpsc::Sender<ClipboardJob>,
}

impl DesktopDriver {
    /// Start the clipboard thread and verify an input connection can open.
    pub fn new() -> Result<Self, DriverError> {
        drop(open()?);
        let (tx, rx) = mpsc::channel::<ClipboardJob>();
        let _ = thread::Builder::new()
            .name("osai-clipboard".into())
            .spawn(move || clipboard_loop(&rx))
            .map_err(|e| DriverError::Clipboard(e.to_string()))?;
        Ok(Self { clipboard: tx })
    }
}

fn clipboard_loop(rx: &mpsc::Receiver<ClipboardJob>) {
    let mut clipboard: Option<arboard::Clipboard> = None;
    while let Ok((text, reply)) = rx.recv() {
        let result = (|| {
            if clipboard.is_none() {
                clipboard = Some(
                    arboard::Clipboard::new().map_err(|e| DriverError::Clipboard(e.to_string()))?,
                );
            }
            match clipboard.as_mut() {
                Some(cb) => cb
                    .set_text(text)
                    .map_err(|e| DriverError::Clipboard(e.to_string())),
                None => Err(DriverError::Clipboard("clipboard not initialized".into())),
            }
        })();
        let _ = reply.send(result);
    }
}

fn open() -> Result<Enigo, DriverError> {
    Enigo::new(&Settings::default()).map_err(|e| DriverError::Unavailable(e.to_string()))
}

fn input_err(e: impl std::fmt::Display) -> DriverError {
    DriverError::Input(e.to_string())
}

fn map_key(name: &str) -> Result<Key, DriverError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Key::Unicode(c));
    }
    Ok(match name {
        "command" | "win" | "super" => Key::Meta,
        "ctrl" => Key::Control,
        "alt" => Key::Alt,
        "shift" => Key::Shift,
        "enter" => Key::Return,
        "escape" => Key::Escape,
        "delete" => Key::Delete,
        "backspace" => Key::Backspace,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "capslock" => Key::CapsLock,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        #[cfg(target_os = "macos")]
        "fn" => Key::Function,
        #[cfg(not(target_os = "macos"))]
        "fn" => {
            return Err(DriverError::Input(
                "the 'fn' key can only be synthesized on macOS".into(),
            ));
        }
        other => return Err(DriverError::Input(format!("unsupported key '{other}'"))),
    })
}

fn map_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

impl InputDriver for DesktopDriver {
    fn screen_size(&self) -> Result<ScreenSize, DriverError> {
        let (w, h) = open()?.main_display().map_err(input_err)?;
        Ok(ScreenSize {
            width: u32::try_from(w).unwrap_or(0),
            height: u32::try_from(h).unwrap_or(0),
        })
    }

    fn cursor_position(&self) -> Result<(i32, i32), DriverError> {
        open()?.location().map_err(input_err)
    }

    fn move_mouse(&self, x: i32, y: i32) -> Result<(), DriverError> {
        open()?.move_mouse(x, y, Coordinate::Abs).map_err(input_err)
    }

    fn click(&self, button: MouseButton, count: u32) -> Result<(), DriverError> {
        let mut enigo = open()?;
        for _ in 0..count {
            enigo
                .button(map_button(button), Direction::Click)
                .map_err(input_err)?;
        }
        Ok(())
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<(), DriverError> {
        let mut enigo = open()?;
        if dy != 0 {
            enigo.scroll(dy, Axis::Vertical).map_err(input_err)?;
        }
        if dx != 0 {
            enigo.scroll(dx, Axis::Horizontal).map_err(input_err)?;
        }
        Ok(())
    }

    fn press(&self, key: &str) -> Result<(), DriverError> {
        open()?.key(map_key(key)?, Direction::Click).map_err(input_err)
    }

    fn hotkey(&self, keys: &[&str]) -> Result<(), DriverError> {
        let mapped = keys.iter().map(|k| map_key(k)).collect::<Result<Vec<_>, _>>()?;
        let mut enigo = open()?;
        let mut pressed = Vec::with_capacity(mapped.len());
        let mut outcome = Ok(());
        for key in &mapped {
            if let Err(e) = enigo.key(*key, Direction::Press) {
                outcome = Err(input_err(e));
                break;
            }
            pressed.push(*key);
        }
        for key in pressed.iter().rev() {
            if let Err(e) = enigo.key(*key, Direction::Release) {
                debug!(error = %e, "key release failed");
            }
        }
        outcome
    }

    fn key_down(&self, key: &str) -> Result<(), DriverError> {
        open()?.key(map_key(key)?, Direction::Press).map_err(input_err)
    }

    fn key_up(&self, key: &str) -> Result<(), DriverError> {
        open()?.key(map_key(key)?, Direction::Release).map_err(input_err)
    }

    fn write(&self, text: &str) -> Result<(), DriverError> {
        open()?.text(text).map_err(input_err)
    }

    fn set_clipboard(&self, text: &str) -> Result<(), DriverError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.clipboard
            .send((text.to_owned(), reply_tx))
            .map_err(|_| DriverError::Clipboard("clipboard thread stopped".into()))?;
        reply_rx
            .recv()
            .map_err(|_| DriverError::Clipboard("clipboard thread stopped".into()))?
    }

    fn screenshot(&self) -> Result<Screenshot, DriverError> {
        let capture = |e: xcap::XCapError| DriverError::Capture(e.to_string());
        let monitor = xcap::Monitor::all()
            .map_err(capture)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::Capture("no monitor found".into()))?;
        let mut image = monitor.capture_image().map_err(capture)?;

        // Scale HiDPI captures down to the logical size the model clicks in.
        let logical = self.screen_size()?;
        if logical.width > 0 && image.width() != logical.width {
            image = imageops::resize(
                &image,
                logical.width,
                logical.height,
                imageops::FilterType::Triangle,
            );
        }

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| DriverError::Capture(e.to_string()))?;
        Ok(Screenshot {
            media_type: "image/png".into(),
            bytes,
        })
    }

    fn native_keys(&self) -> Option<&dyn NativeKeys> {
        if cfg!(target_os = "macos") {
            Some(self)
        } else {
            None
        }
    }
}

impl NativeKeys for DesktopDriver {
    fn press_enter(&self) -> Result<(), DriverError> {
        open()?
            .raw(MAC_RETURN_KEYCODE, Direction::Click)
            .map_err(input_err)
    }
}
