//! Records of in-flight gestures and the outcomes of gesture actions.
//!
//! ```text
//! Idle -> Dragging | Resizing -> (commit | cancel) -> Idle
//! Idle -> DraggingSection     -> (commit | cancel) -> Idle
//! ```
//!
//! At most one gesture is active per [`GridLayoutState`](crate::GridLayoutState).

use panelgrid_core::{PixelRect, PointerPosition, SensorOffsets, SensorType};
use panelgrid_layout::{PanelId, SectionId};
use serde::{Deserialize, Serialize};

/// What a panel gesture changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelInteractionKind {
    /// Moves the panel, possibly into another section.
    Drag,
    /// Changes width and height; the top-left corner stays put.
    Resize,
}

/// The active panel gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelInteraction {
    pub kind: PanelInteractionKind,
    pub id: PanelId,
    /// Section the panel is currently being placed into.
    pub target_section: SectionId,
    /// Section the panel belonged to when the gesture started.
    pub origin_section: SectionId,
    pub sensor_type: SensorType,
    pub sensor_offsets: SensorOffsets,
    /// Panel rectangle when the gesture started.
    pub start_rect: PixelRect,
    /// Latest pointer, real or virtual (keyboard).
    pub pointer: PointerPosition,
}

/// The panel under a gesture and where its preview is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePanel {
    pub id: PanelId,
    pub position: PixelRect,
}

/// Pointer travel since a section drag started.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

/// The active section (header) drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDragEvent {
    pub id: SectionId,
    /// Header rectangle when the drag started.
    pub starting_position: PixelRect,
    pub starting_pointer: PointerPosition,
    pub pointer: PointerPosition,
    pub sensor_type: SensorType,
    pub translate: Translate,
    /// Main section the header currently hovers inside, if any.
    pub target_section: Option<SectionId>,
}

impl SectionDragEvent {
    /// Where the dragged header is drawn now.
    #[must_use]
    pub fn header_rect(&self) -> PixelRect {
        self.starting_position
            .translated(self.translate.y, self.translate.x)
    }
}

/// Which gesture, if any, is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionPhase {
    Idle,
    Dragging,
    Resizing,
    DraggingSection,
}

/// Why a gesture action did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    /// Move, commit, or cancel without a matching gesture.
    NoActiveInteraction,
    /// Start while another gesture is active.
    InteractionInProgress,
    UnknownPanel,
    UnknownSection,
    /// The panel has no measured rectangle yet.
    PanelNotMounted,
    /// The section header has no measured rectangle yet.
    HeaderNotMounted,
    /// The target section's body has no measured rectangle this frame.
    SectionNotMounted,
    /// Main sections have no header to drag.
    MainSectionNotDraggable,
}

/// Effect of one gesture action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InteractionOutcome {
    Started,
    /// `resolved` is false when the requested placement was unchanged and
    /// no resolver ran.
    Moved { resolved: bool },
    /// `changed` reports whether the canonical layout differs from its
    /// pre-gesture value.
    Committed { changed: bool },
    /// `restored` reports whether any staged or live change was discarded.
    Cancelled { restored: bool },
    Noop { reason: NoopReason },
}

impl InteractionOutcome {
    pub(crate) const fn noop(reason: NoopReason) -> Self {
        Self::Noop { reason }
    }

    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Noop { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_rect_follows_translate() {
        let event = SectionDragEvent {
            id: "s".into(),
            starting_position: PixelRect::new(100.0, 0.0, 130.0, 500.0),
            starting_pointer: PointerPosition::new(10.0, 110.0),
            pointer: PointerPosition::new(10.0, 60.0),
            sensor_type: SensorType::Mouse,
            translate: Translate { x: 0.0, y: -50.0 },
            target_section: None,
        };
        assert_eq!(event.header_rect(), PixelRect::new(50.0, 0.0, 80.0, 500.0));
    }

    #[test]
    fn outcomes_serialize_with_tags() {
        let json = serde_json::to_string(&InteractionOutcome::noop(NoopReason::PanelNotMounted))
            .expect("serialize");
        assert_eq!(json, r#"{"outcome":"noop","reason":"panel_not_mounted"}"#);
        assert!(InteractionOutcome::noop(NoopReason::UnknownPanel).is_noop());
        assert!(!InteractionOutcome::Started.is_noop());
    }
}
