//! Section header drags.
//!
//! Unlike panel gestures, a section drag writes the canonical layout on
//! every move so the surrounding sections reflow live. The layout from
//! before the drag is kept until commit or cancel; cancel puts it back.

use panelgrid_core::{
    AnchorCorner, InteractionInput, PixelRect, SensorType, keyboard_anchor, next_keyboard_pointer,
};
use panelgrid_layout::{
    Layout, SectionId, is_layout_equal, reorder_sections, resolve_sections, split_section_at_row,
};
use tracing::{debug, trace};

use crate::interaction::{
    InteractionOutcome, InteractionPhase, NoopReason, SectionDragEvent, Translate,
};
use crate::measure::ElementMeasurer;
use crate::state::GridLayoutState;

impl GridLayoutState {
    /// Start dragging the header of named section `section`.
    pub fn start_section_drag(&self, input: InteractionInput, section: &str) -> InteractionOutcome {
        if self.phase() != InteractionPhase::Idle {
            trace!(section, "section drag ignored: another gesture is active");
            return InteractionOutcome::noop(NoopReason::InteractionInProgress);
        }
        let layout = self.layout.get();
        let Some(target) = layout.section(section) else {
            return InteractionOutcome::noop(NoopReason::UnknownSection);
        };
        if target.is_main_section {
            return InteractionOutcome::noop(NoopReason::MainSectionNotDraggable);
        }
        let Some(header) = self.measurer.header_rect(section) else {
            trace!(section, "section drag ignored: header not mounted");
            return InteractionOutcome::noop(NoopReason::HeaderNotMounted);
        };

        let sensor_type = SensorType::of(&input);
        let pointer = input
            .position()
            .unwrap_or_else(|| keyboard_anchor(&header, AnchorCorner::TopLeft));
        let id = target.id.clone();
        self.section_snapshot.replace(Some(layout));
        self.active_section.set(Some(SectionDragEvent {
            id,
            starting_position: header,
            starting_pointer: pointer,
            pointer,
            sensor_type,
            translate: Translate::default(),
            target_section: None,
        }));

        debug!(section, ?sensor_type, "section drag started");
        InteractionOutcome::Started
    }

    /// Advance the active section drag.
    ///
    /// While the dragged header sits inside an expanded main section, that
    /// section is split around the header's row. Elsewhere sections are
    /// reordered by the vertical midpoints of what is on screen.
    pub fn move_section_drag(&self, input: InteractionInput) -> InteractionOutcome {
        let Some(mut event) = self.active_section.get() else {
            return InteractionOutcome::noop(NoopReason::NoActiveInteraction);
        };
        let settings = self.settings.get();
        event.pointer = match input {
            InteractionInput::Pointer { position, .. } => position,
            InteractionInput::Keyboard { key } => next_keyboard_pointer(
                event.pointer,
                key,
                settings.column_step(),
                settings.row_step(),
            ),
        };
        event.translate = Translate {
            x: event.pointer.client_x - event.starting_pointer.client_x,
            y: event.pointer.client_y - event.starting_pointer.client_y,
        };
        let header = event.header_rect();

        let layout = self.layout.get();
        let target = main_section_under_header(&layout, &event.id, &header, &*self.measurer);
        let next = match &target {
            Some((id, body)) => {
                let row = (header.top - body.top) / settings.row_step();
                let row = if row.is_finite() && row > 0.0 {
                    row.round() as u32
                } else {
                    0
                };
                split_section_at_row(&layout, id.as_str(), row, event.id.as_str())
            }
            None => {
                let ordered = ids_by_midpoint(&layout, &event.id, &header, &*self.measurer);
                resolve_sections(&reorder_sections(&layout, &ordered))
            }
        };
        event.target_section = target.map(|(id, _)| id);

        let resolved = !is_layout_equal(&next, &layout);
        if resolved {
            self.layout.set(next);
            self.sync_visible();
            trace!(section = %event.id, target = ?event.target_section, "sections rearranged");
        }
        self.active_section.set(Some(event));
        InteractionOutcome::Moved { resolved }
    }

    /// Keep the live layout and end the drag.
    pub fn commit_section_drag(&self) -> InteractionOutcome {
        let Some(event) = self.active_section.get() else {
            return InteractionOutcome::noop(NoopReason::NoActiveInteraction);
        };
        self.active_section.set(None);
        let changed = self
            .section_snapshot
            .take()
            .is_some_and(|snapshot| !self.layout.with(|layout| is_layout_equal(layout, &snapshot)));
        self.measurer.scroll_into_view(event.id.as_str());

        debug!(section = %event.id, changed, "section drag committed");
        InteractionOutcome::Committed { changed }
    }

    /// Restore the layout from before the drag and end it.
    pub fn cancel_section_drag(&self) -> InteractionOutcome {
        let Some(event) = self.active_section.get() else {
            return InteractionOutcome::noop(NoopReason::NoActiveInteraction);
        };
        self.active_section.set(None);
        let restored = match self.section_snapshot.take() {
            Some(snapshot) => {
                let restored = self.layout.set(snapshot);
                if restored {
                    self.sync_visible();
                }
                restored
            }
            None => false,
        };
        self.measurer.scroll_into_view(event.id.as_str());

        debug!(section = %event.id, restored, "section drag cancelled");
        InteractionOutcome::Cancelled { restored }
    }
}

/// Last expanded main section (in order) whose body vertically contains the
/// dragged header.
fn main_section_under_header(
    layout: &Layout,
    dragged: &SectionId,
    header: &PixelRect,
    measurer: &dyn ElementMeasurer,
) -> Option<(SectionId, PixelRect)> {
    let mut found = None;
    for section in layout.sections_in_order() {
        if &section.id == dragged || !section.is_expanded() {
            continue;
        }
        let Some(body) = measurer.section_rect(section.id.as_str()) else {
            continue;
        };
        if body.contains_vertically(header) {
            found = Some((section, body));
        }
    }
    found
        .filter(|(section, _)| section.is_main_section)
        .map(|(section, body)| (section.id.clone(), body))
}

/// Section ids sorted by the vertical midpoint of their on-screen block.
///
/// The dragged section is placed by its moving header; others by their body
/// or, when collapsed, their header. Unmeasured sections keep their place
/// after the measured ones.
fn ids_by_midpoint(
    layout: &Layout,
    dragged: &SectionId,
    header: &PixelRect,
    measurer: &dyn ElementMeasurer,
) -> Vec<SectionId> {
    let mut measured: Vec<(SectionId, f64)> = layout
        .sections_in_order()
        .into_iter()
        .filter_map(|section| {
            let rect = if &section.id == dragged {
                Some(*header)
            } else {
                measurer
                    .section_rect(section.id.as_str())
                    .or_else(|| measurer.header_rect(section.id.as_str()))
            }?;
            Some((section.id.clone(), rect.vertical_midpoint()))
        })
        .collect();
    measured.sort_by(|a, b| a.1.total_cmp(&b.1));
    measured.into_iter().map(|(id, _)| id).collect()
}
