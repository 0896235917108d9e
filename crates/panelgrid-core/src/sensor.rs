#![forbid(unsafe_code)]

//! Input sensor normalization.
//!
//! Pointer, touch, and keyboard input are reduced to one shape: a
//! [`PointerPosition`] plus a [`SensorType`]. Geometry helpers then turn that
//! position into a preview rectangle for the element being dragged or
//! resized.
//!
//! # Keyboard
//!
//! The keyboard has no pointer. A keyboard gesture starts from a virtual
//! pointer placed on the grabbed element's anchor corner (see
//! [`keyboard_anchor`]) and every arrow key moves that virtual pointer by
//! exactly one grid cell (see [`next_keyboard_pointer`]). Because the offsets
//! are computed from the virtual pointer, keyboard previews keep the element's
//! size.

use serde::{Deserialize, Serialize};

use crate::geometry::{PixelRect, PointerPosition, SensorOffsets};

/// Physical source of a pointer-like input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Arrow keys accepted by keyboard gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKey {
    Up,
    Down,
    Left,
    Right,
}

impl NavigationKey {
    /// Unit cell delta `(columns, rows)` for this key.
    #[must_use]
    pub const fn cell_delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// One normalized interaction input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sensor", rename_all = "snake_case")]
pub enum InteractionInput {
    Pointer {
        position: PointerPosition,
        kind: PointerKind,
    },
    Keyboard {
        key: NavigationKey,
    },
}

impl InteractionInput {
    /// Mouse input at `(x, y)`.
    #[must_use]
    pub const fn mouse(client_x: f64, client_y: f64) -> Self {
        Self::Pointer {
            position: PointerPosition::new(client_x, client_y),
            kind: PointerKind::Mouse,
        }
    }

    /// Touch input at `(x, y)`.
    #[must_use]
    pub const fn touch(client_x: f64, client_y: f64) -> Self {
        Self::Pointer {
            position: PointerPosition::new(client_x, client_y),
            kind: PointerKind::Touch,
        }
    }

    /// Keyboard input.
    #[must_use]
    pub const fn key(key: NavigationKey) -> Self {
        Self::Keyboard { key }
    }

    /// Pointer position, if this input carries one.
    #[must_use]
    pub const fn position(&self) -> Option<PointerPosition> {
        match self {
            Self::Pointer { position, .. } => Some(*position),
            Self::Keyboard { .. } => None,
        }
    }
}

/// Sensor that originated a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Mouse,
    Touch,
    Keyboard,
}

impl SensorType {
    /// Classify an input.
    #[must_use]
    pub const fn of(input: &InteractionInput) -> Self {
        match input {
            InteractionInput::Pointer {
                kind: PointerKind::Mouse,
                ..
            } => Self::Mouse,
            InteractionInput::Pointer {
                kind: PointerKind::Touch,
                ..
            } => Self::Touch,
            InteractionInput::Keyboard { .. } => Self::Keyboard,
        }
    }

    #[must_use]
    pub const fn is_keyboard(self) -> bool {
        matches!(self, Self::Keyboard)
    }
}

/// Which corner of an element a keyboard gesture is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorCorner {
    /// Drags move the top-left corner.
    TopLeft,
    /// Resizes move the bottom-right corner.
    BottomRight,
}

/// Virtual pointer position for a keyboard gesture on `rect`.
#[must_use]
pub fn keyboard_anchor(rect: &PixelRect, corner: AnchorCorner) -> PointerPosition {
    match corner {
        AnchorCorner::TopLeft => PointerPosition::new(rect.left, rect.top),
        AnchorCorner::BottomRight => PointerPosition::new(rect.right, rect.bottom),
    }
}

/// Offsets between `pointer` and the edges of `element`.
#[must_use]
pub fn get_sensor_offsets(pointer: PointerPosition, element: &PixelRect) -> SensorOffsets {
    SensorOffsets {
        top: pointer.client_y - element.top,
        left: pointer.client_x - element.left,
        bottom: element.bottom - pointer.client_y,
        right: element.right - pointer.client_x,
    }
}

/// Preview rectangle for a drag: the grabbed point stays under the pointer.
#[must_use]
pub fn get_drag_preview_rect(offsets: &SensorOffsets, pointer: PointerPosition) -> PixelRect {
    PixelRect {
        top: pointer.client_y - offsets.top,
        left: pointer.client_x - offsets.left,
        bottom: pointer.client_y + offsets.bottom,
        right: pointer.client_x + offsets.right,
    }
}

/// Preview rectangle for a resize.
///
/// The top-left corner stays where the element was when the gesture started;
/// bottom and right follow the pointer. `right` is clamped to `max_right`
/// (the grid's right edge) and neither edge can cross the anchored one.
#[must_use]
pub fn get_resize_preview_rect(
    start: &PixelRect,
    offsets: &SensorOffsets,
    pointer: PointerPosition,
    max_right: f64,
) -> PixelRect {
    let right = (pointer.client_x + offsets.right).min(max_right).max(start.left);
    let bottom = (pointer.client_y + offsets.bottom).max(start.top);
    PixelRect {
        top: start.top,
        left: start.left,
        bottom,
        right,
    }
}

/// Move a keyboard gesture's virtual pointer by one cell.
#[must_use]
pub fn next_keyboard_pointer(
    pointer: PointerPosition,
    key: NavigationKey,
    column_step: f64,
    row_step: f64,
) -> PointerPosition {
    let (dx, dy) = key.cell_delta();
    pointer.offset_by(f64::from(dx) * column_step, f64::from(dy) * row_step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> PixelRect {
        PixelRect::from_origin_size(100.0, 200.0, 120.0, 60.0)
    }

    #[test]
    fn classifies_sensors() {
        assert_eq!(SensorType::of(&InteractionInput::mouse(0.0, 0.0)), SensorType::Mouse);
        assert_eq!(SensorType::of(&InteractionInput::touch(0.0, 0.0)), SensorType::Touch);
        let key = InteractionInput::key(NavigationKey::Down);
        assert!(SensorType::of(&key).is_keyboard());
        assert_eq!(key.position(), None);
    }

    #[test]
    fn offsets_measure_grab_point() {
        let offsets = get_sensor_offsets(PointerPosition::new(130.0, 210.0), &panel());
        assert_eq!(
            offsets,
            SensorOffsets {
                top: 10.0,
                left: 30.0,
                bottom: 50.0,
                right: 90.0,
            }
        );
    }

    #[test]
    fn drag_preview_keeps_grab_point_under_pointer() {
        let rect = panel();
        let offsets = get_sensor_offsets(PointerPosition::new(130.0, 210.0), &rect);
        let preview = get_drag_preview_rect(&offsets, PointerPosition::new(180.0, 300.0));
        assert_eq!(preview, rect.translated(90.0, 50.0));
        assert_eq!(preview.width(), rect.width());
        assert_eq!(preview.height(), rect.height());
    }

    #[test]
    fn resize_preview_anchors_top_left_and_clamps_right() {
        let rect = panel();
        let offsets = get_sensor_offsets(PointerPosition::new(215.0, 255.0), &rect);
        let preview =
            get_resize_preview_rect(&rect, &offsets, PointerPosition::new(400.0, 300.0), 350.0);
        assert_eq!(preview.top, rect.top);
        assert_eq!(preview.left, rect.left);
        assert_eq!(preview.right, 350.0);
        assert_eq!(preview.bottom, 305.0);
    }

    #[test]
    fn resize_preview_never_inverts() {
        let rect = panel();
        let offsets = get_sensor_offsets(keyboard_anchor(&rect, AnchorCorner::BottomRight), &rect);
        let preview =
            get_resize_preview_rect(&rect, &offsets, PointerPosition::new(0.0, 0.0), 1000.0);
        assert_eq!(preview.right, rect.left);
        assert_eq!(preview.bottom, rect.top);
    }

    #[test]
    fn keyboard_anchor_preserves_size() {
        let rect = panel();
        let anchor = keyboard_anchor(&rect, AnchorCorner::TopLeft);
        let offsets = get_sensor_offsets(anchor, &rect);
        assert_eq!(offsets.top, 0.0);
        assert_eq!(offsets.left, 0.0);
        let moved = next_keyboard_pointer(anchor, NavigationKey::Right, 28.0, 28.0);
        let preview = get_drag_preview_rect(&offsets, moved);
        assert_eq!(preview, rect.translated(0.0, 28.0));
    }

    #[test]
    fn keyboard_steps_are_one_cell() {
        let p = PointerPosition::new(50.0, 50.0);
        assert_eq!(
            next_keyboard_pointer(p, NavigationKey::Up, 10.0, 30.0),
            PointerPosition::new(50.0, 20.0)
        );
        assert_eq!(
            next_keyboard_pointer(p, NavigationKey::Left, 10.0, 30.0),
            PointerPosition::new(40.0, 50.0)
        );
    }
}
