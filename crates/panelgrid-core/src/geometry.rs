#![forbid(unsafe_code)]

//! Pixel-space geometric primitives.
//!
//! All values are client pixels (origin at the top-left of the viewport), the
//! same space a host's element measurement reports.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in client pixels.
///
/// Edges are stored directly rather than origin + size so that previews built
/// from a pointer and edge offsets need no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl PixelRect {
    /// Create a rectangle from its four edges.
    #[inline]
    #[must_use]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Create a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(top, left, top + height, left + width)
    }

    /// Width in pixels (never negative).
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        (self.right - self.left).max(0.0)
    }

    /// Height in pixels (never negative).
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Vertical centre line.
    #[inline]
    #[must_use]
    pub fn vertical_midpoint(&self) -> f64 {
        self.top + self.height() / 2.0
    }

    /// Signed overlap between `[top, bottom]` and this rect's vertical span.
    ///
    /// Negative when the spans are disjoint; the magnitude is the gap.
    #[inline]
    #[must_use]
    pub fn vertical_overlap(&self, top: f64, bottom: f64) -> f64 {
        bottom.min(self.bottom) - top.max(self.top)
    }

    /// Whether `other`'s vertical span lies entirely inside this rect's.
    #[inline]
    #[must_use]
    pub fn contains_vertically(&self, other: &PixelRect) -> bool {
        other.top >= self.top && other.bottom <= self.bottom
    }

    /// Shift the rectangle by the given deltas.
    #[must_use]
    pub fn translated(&self, dy: f64, dx: f64) -> Self {
        Self::new(self.top + dy, self.left + dx, self.bottom + dy, self.right + dx)
    }
}

/// A pointer location in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }

    /// Return the position moved by `(dx, dy)`.
    #[must_use]
    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self::new(self.client_x + dx, self.client_y + dy)
    }
}

/// Distances from the pointer to each edge of the element it grabbed.
///
/// `top`/`left` are measured from the element edge to the pointer,
/// `bottom`/`right` from the pointer to the element edge, so all four are
/// non-negative while the pointer is inside the element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorOffsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}
