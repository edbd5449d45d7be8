//! Coordinate-space mapping for mouse actions.

use crate::driver::ScreenSize;
use crate::errors::ToolError;

/// How the model expressed a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CoordinateSpace {
    /// Absolute pixels.
    #[default]
    Screen,
    /// Fractions of the screen in `0.0..=1.0`.
    Normalized,
    /// Normalized when both values are within `0.0..=1.0`, otherwise pixels.
    Auto,
}

impl CoordinateSpace {
    /// Parse the `coordinate_space` parameter; absent means `Screen`.
    pub fn parse(value: Option<&str>) -> Result<Self, ToolError> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("screen" | "absolute" | "pixels") => Ok(Self::Screen),
            Some("normalized" | "normalised" | "relative") => Ok(Self::Normalized),
            Some("auto") => Ok(Self::Auto),
            Some(other) => Err(ToolError::validation(format!(
                "unknown coordinate_space '{other}'"
            ))),
        }
    }
}

/// Map `(x, y)` to absolute pixels against `screen`, clamped to its bounds.
///
/// `screen` must be the size at call time, not the one advertised when the
/// tool was declared.
#[allow(clippy::cast_possible_truncation)]
pub fn resolve(x: f64, y: f64, space: CoordinateSpace, screen: ScreenSize) -> Result<(i32, i32), ToolError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ToolError::validation("coordinate must be finite"));
    }
    let normalized = match space {
        CoordinateSpace::Screen => false,
        CoordinateSpace::Normalized => true,
        CoordinateSpace::Auto => (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y),
    };
    let width = f64::from(screen.width);
    let height = f64::from(screen.height);
    let (px, py) = if normalized {
        (x.clamp(0.0, 1.0) * width, y.clamp(0.0, 1.0) * height)
    } else {
        (x, y)
    };
    let max_x = (width - 1.0).max(0.0);
    let max_y = (height - 1.0).max(0.0);
    Ok((px.round().clamp(0.0, max_x) as i32, py.round().clamp(0.0, max_y) as i32))
}
