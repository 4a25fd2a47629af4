#![forbid(unsafe_code)]

//! Geometric primitives.

/// A measured rectangle in host coordinates (CSS pixels or equivalent).
///
/// Origin is the top-left of the viewport. Values are whatever the host's
/// measurement capability reports; negative origins are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Horizontal center: `x + width / 2`.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// A rectangle of the same size whose horizontal center sits at `center_x`.
    #[inline]
    pub fn centered_on_x(&self, center_x: f64) -> Rect {
        Rect::new(center_x - self.width / 2.0, self.y, self.width, self.height)
    }
}

/// Size of the host viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
