//! # osai-tools
//!
//! The `computer` tool and everything it needs to act on the host OS.
//!
//! - [`driver::InputDriver`]: the synchronous OS primitives (keys, mouse,
//!   clipboard, screenshot), with an optional [`driver::NativeKeys`] path
//! - [`keys`]: platform modifier aliases and chord parsing
//! - [`coords`]: screen/normalized/auto coordinate mapping
//! - [`computer::ComputerTool`]: action dispatch and typing policy
//! - [`registry::ToolRegistry`]: name → tool, with result normalization
//!
//! The `desktop` feature adds [`desktop::DesktopDriver`] backed by enigo,
//! arboard and xcap.

#![deny(unsafe_code)]

pub mod computer;
pub mod coords;
#[cfg(feature = "desktop")]
pub mod desktop;
pub mod driver;
pub mod errors;
pub mod keys;
pub mod registry;
pub mod traits;

pub use computer::ComputerTool;
pub use driver::{InputDriver, MouseButton, NativeKeys, ScreenSize, Screenshot, UnavailableDriver};
pub use errors::{DriverError, ToolError};
pub use keys::Platform;
pub use registry::{ToolOutput, ToolRegistry};
pub use traits::DesktopTool;
