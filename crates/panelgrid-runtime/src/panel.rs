//! Panel drag and resize gestures.
//!
//! # Placement per move
//!
//! 1. Preview rectangle from the pointer: a drag keeps the grabbed point
//!    under the pointer, a resize keeps the top-left corner and clamps the
//!    right edge to the canvas.
//! 2. Target section: for pointer drags, the expanded section whose body
//!    overlaps `[preview.top, preview.top + row_height]` the most (sections
//!    in order, ties keep the first). A preview overlapping no body, as well
//!    as keyboard gestures and resizes, stays in the current section.
//! 3. Cell coordinate: offsets from the target body divided by the cell
//!    step and rounded; columns clamped to `[0, max_column]`.
//! 4. Only when the target section or the requested coordinate changed: the
//!    panel leaves its current section (which is compacted if it is a
//!    different one) and the target is resolved with the request. The
//!    staged layout is written only if it differs structurally.

use panelgrid_core::{
    AnchorCorner, InteractionInput, PixelRect, PointerPosition, RuntimeSettings, SensorType,
    get_drag_preview_rect, get_resize_preview_rect, get_sensor_offsets, keyboard_anchor,
    next_keyboard_pointer,
};
use panelgrid_layout::{
    GridCoordinate, Layout, Panel, SectionId, is_layout_equal, resolve_section,
};
use tracing::{debug, trace};

use crate::interaction::{
    ActivePanel, InteractionOutcome, InteractionPhase, NoopReason, PanelInteraction,
    PanelInteractionKind,
};
use crate::measure::ElementMeasurer;
use crate::state::{GridLayoutState, PanelRequest};

impl GridLayoutState {
    /// Start moving `panel`, which lives in `section`.
    pub fn start_drag(
        &self,
        input: InteractionInput,
        panel: &str,
        section: &str,
    ) -> InteractionOutcome {
        self.start_panel_interaction(PanelInteractionKind::Drag, input, panel, section)
    }

    /// Start resizing `panel` from its bottom-right corner.
    pub fn start_resize(
        &self,
        input: InteractionInput,
        panel: &str,
        section: &str,
    ) -> InteractionOutcome {
        self.start_panel_interaction(PanelInteractionKind::Resize, input, panel, section)
    }

    fn start_panel_interaction(
        &self,
        kind: PanelInteractionKind,
        input: InteractionInput,
        panel: &str,
        section: &str,
    ) -> InteractionOutcome {
        if self.phase() != InteractionPhase::Idle {
            trace!(panel, "panel gesture ignored: another gesture is active");
            return InteractionOutcome::noop(NoopReason::InteractionInProgress);
        }
        let layout = self.layout.get();
        let Some(owner) = layout.section(section).filter(|s| s.panels.contains_key(panel)) else {
            return InteractionOutcome::noop(NoopReason::UnknownPanel);
        };
        let Some(rect) = self.measurer.panel_rect(panel) else {
            trace!(panel, "panel gesture ignored: panel not mounted");
            return InteractionOutcome::noop(NoopReason::PanelNotMounted);
        };

        let corner = match kind {
            PanelInteractionKind::Drag => AnchorCorner::TopLeft,
            PanelInteractionKind::Resize => AnchorCorner::BottomRight,
        };
        let sensor_type = SensorType::of(&input);
        let pointer = input
            .position()
            .unwrap_or_else(|| keyboard_anchor(&rect, corner));

        self.last_request.replace(None);
        self.interaction.set(Some(PanelInteraction {
            kind,
            id: panel.into(),
            target_section: owner.id.clone(),
            origin_section: owner.id.clone(),
            sensor_type,
            sensor_offsets: get_sensor_offsets(pointer, &rect),
            start_rect: rect,
            pointer,
        }));
        self.active_panel.set(Some(ActivePanel {
            id: panel.into(),
            position: rect,
        }));
        self.proposed_layout.set(Some(layout));
        self.sync_visible();

        debug!(panel, section, ?kind, ?sensor_type, "panel gesture started");
        InteractionOutcome::Started
    }

    /// Advance the active panel gesture.
    ///
    /// Pointer input moves the pointer to its position; a navigation key
    /// moves the (virtual) pointer by one cell.
    pub fn move_panel(&self, input: InteractionInput) -> InteractionOutcome {
        let Some(mut interaction) = self.interaction.get() else {
            return InteractionOutcome::noop(NoopReason::NoActiveInteraction);
        };
        let settings = self.settings.get();
        let proposed = self
            .proposed_layout
            .get()
            .unwrap_or_else(|| self.layout.get());
        let Some((_, current)) = proposed.find_panel(interaction.id.as_str()) else {
            return InteractionOutcome::noop(NoopReason::UnknownPanel);
        };
        let current = current.clone();

        let pointer = next_pointer(interaction.pointer, &input, &settings);
        let is_resize = interaction.kind == PanelInteractionKind::Resize;
        let preview = if is_resize {
            let max_right = self
                .measurer
                .canvas_rect()
                .map_or(f64::INFINITY, |canvas| canvas.right);
            get_resize_preview_rect(
                &interaction.start_rect,
                &interaction.sensor_offsets,
                pointer,
                max_right,
            )
        } else {
            get_drag_preview_rect(&interaction.sensor_offsets, pointer)
        };

        interaction.pointer = pointer;
        self.active_panel.set(Some(ActivePanel {
            id: interaction.id.clone(),
            position: preview,
        }));

        let target = if is_resize || interaction.sensor_type.is_keyboard() {
            interaction.target_section.clone()
        } else {
            self.section_under_preview(&proposed, &preview, &settings)
                .unwrap_or_else(|| interaction.target_section.clone())
        };
        let Some(target_rect) = self.measurer.section_rect(target.as_str()) else {
            self.interaction.set(Some(interaction));
            trace!(section = %target, "panel move skipped: section not mounted");
            return InteractionOutcome::noop(NoopReason::SectionNotMounted);
        };

        let requested = requested_coordinate(
            &proposed,
            &target,
            target_rect,
            &preview,
            &current,
            is_resize,
            &settings,
            &*self.measurer,
        );
        let request = PanelRequest {
            section: target.clone(),
            coordinate: requested,
        };
        interaction.target_section = target.clone();
        self.interaction.set(Some(interaction));

        if self.last_request.borrow().as_ref() == Some(&request) {
            trace!(section = %target, "panel move skipped: request unchanged");
            return InteractionOutcome::Moved { resolved: false };
        }

        let next = place_panel(&proposed, &current, &target, requested);
        self.last_request.replace(Some(request));
        if !is_layout_equal(&next, &proposed) {
            self.proposed_layout.set(Some(next));
            self.sync_visible();
        }
        trace!(
            panel = %current.id,
            section = %target,
            column = requested.column,
            row = requested.row,
            width = requested.width,
            height = requested.height,
            "panel placement resolved"
        );
        InteractionOutcome::Moved { resolved: true }
    }

    /// Promote the staged layout and end the gesture.
    pub fn commit_panel(&self) -> InteractionOutcome {
        let Some(interaction) = self.interaction.get() else {
            return InteractionOutcome::noop(NoopReason::NoActiveInteraction);
        };
        self.interaction.set(None);
        self.active_panel.set(None);
        self.last_request.replace(None);

        let changed = match self.proposed_layout.get() {
            Some(proposed) if !self.layout.with(|layout| is_layout_equal(layout, &proposed)) => {
                self.layout.set(proposed)
            }
            _ => false,
        };
        self.proposed_layout.set(None);
        self.sync_visible();

        debug!(panel = %interaction.id, changed, "panel gesture committed");
        InteractionOutcome::Committed { changed }
    }

    /// Discard the staged layout and end the gesture.
    pub fn cancel_panel(&self) -> InteractionOutcome {
        let Some(interaction) = self.interaction.get() else {
            return InteractionOutcome::noop(NoopReason::NoActiveInteraction);
        };
        self.interaction.set(None);
        self.active_panel.set(None);
        self.last_request.replace(None);

        let restored = self.proposed_layout.get().is_some_and(|proposed| {
            !self.layout.with(|layout| is_layout_equal(layout, &proposed))
        });
        self.proposed_layout.set(None);
        self.sync_visible();

        debug!(panel = %interaction.id, restored, "panel gesture cancelled");
        InteractionOutcome::Cancelled { restored }
    }

    /// Expanded section whose body overlaps the preview's top row the most.
    ///
    /// `None` when the preview touches no section body; the gesture then
    /// keeps its current target.
    fn section_under_preview(
        &self,
        layout: &Layout,
        preview: &PixelRect,
        settings: &RuntimeSettings,
    ) -> Option<SectionId> {
        let probe_top = preview.top;
        let probe_bottom = preview.top + settings.row_height;
        let mut best: Option<(SectionId, f64)> = None;
        for section in layout.sections_in_order() {
            if !section.is_expanded() {
                continue;
            }
            let Some(rect) = self.measurer.section_rect(section.id.as_str()) else {
                continue;
            };
            let overlap = rect.vertical_overlap(probe_top, probe_bottom);
            if overlap > 0.0 && best.as_ref().is_none_or(|(_, top)| overlap > *top) {
                best = Some((section.id.clone(), overlap));
            }
        }
        best.map(|(id, _)| id)
    }
}

fn next_pointer(
    pointer: PointerPosition,
    input: &InteractionInput,
    settings: &RuntimeSettings,
) -> PointerPosition {
    match input {
        InteractionInput::Pointer { position, .. } => *position,
        InteractionInput::Keyboard { key } => {
            next_keyboard_pointer(pointer, *key, settings.column_step(), settings.row_step())
        }
    }
}

/// Grid coordinate the preview asks for inside `target`.
#[allow(clippy::too_many_arguments)]
fn requested_coordinate(
    layout: &Layout,
    target: &SectionId,
    target_rect: PixelRect,
    preview: &PixelRect,
    current: &Panel,
    is_resize: bool,
    settings: &RuntimeSettings,
    measurer: &dyn ElementMeasurer,
) -> GridCoordinate {
    let mut top = target_rect.top;
    let is_main = layout
        .section(target.as_str())
        .is_some_and(|section| section.is_main_section);
    if is_main {
        top += named_blocks_above(layout, target_rect.top, preview.top, settings, measurer);
    }

    let (local_x, local_y) = if is_resize {
        (preview.right - target_rect.left, preview.bottom - top)
    } else {
        (preview.left - target_rect.left, preview.top - top)
    };
    let max_column = if is_resize {
        settings.column_count
    } else {
        settings.column_count.saturating_sub(current.width)
    };
    let column = to_cells(local_x, settings.column_step()).min(max_column);
    let row = to_cells(local_y, settings.row_step());

    if is_resize {
        GridCoordinate {
            width: column.saturating_sub(current.column).max(1),
            height: row.saturating_sub(current.row).max(1),
            ..current.coordinate()
        }
    } else {
        GridCoordinate {
            column,
            row,
            ..current.coordinate()
        }
    }
}

/// Pixel height of expanded named sections (header and body) lying between
/// the top of a main section and the preview.
fn named_blocks_above(
    layout: &Layout,
    main_top: f64,
    preview_top: f64,
    settings: &RuntimeSettings,
    measurer: &dyn ElementMeasurer,
) -> f64 {
    layout
        .sections()
        .filter(|section| !section.is_main_section && section.is_expanded())
        .filter_map(|section| {
            let body = measurer.section_rect(section.id.as_str())?;
            let block_top = measurer
                .header_rect(section.id.as_str())
                .map_or(body.top, |header| header.top);
            (block_top >= main_top && body.bottom <= preview_top)
                .then(|| body.bottom - block_top + settings.gutter_size)
        })
        .sum()
}

/// Round a pixel offset to whole cells, never below zero.
fn to_cells(offset: f64, step: f64) -> u32 {
    if step <= 0.0 || !offset.is_finite() {
        return 0;
    }
    let cells = (offset / step).round();
    if cells <= 0.0 {
        0
    } else if cells >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        cells as u32
    }
}

/// Move `panel` to `coordinate` in `target`, compacting the section it left.
fn place_panel(
    layout: &Layout,
    panel: &Panel,
    target: &SectionId,
    coordinate: GridCoordinate,
) -> Layout {
    let mut next = layout.clone();
    let origin = layout
        .find_panel(panel.id.as_str())
        .map(|(section, _)| section.clone());
    if let Some(origin) = origin.filter(|origin| origin != target) {
        if let Some(section) = next.section_mut(origin.as_str()) {
            section.panels.remove(panel.id.as_str());
            section.panels = resolve_section(&section.panels, None);
        }
    }
    if let Some(section) = next.section_mut(target.as_str()) {
        let requested = panel.with_coordinate(coordinate);
        section.panels = resolve_section(&section.panels, Some(&requested));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_round_to_nearest() {
        assert_eq!(to_cells(0.0, 34.0), 0);
        assert_eq!(to_cells(16.9, 34.0), 0);
        assert_eq!(to_cells(17.0, 34.0), 1);
        assert_eq!(to_cells(-40.0, 34.0), 0);
        assert_eq!(to_cells(f64::NAN, 34.0), 0);
        assert_eq!(to_cells(100.0, 0.0), 0);
    }

    #[test]
    fn placing_across_sections_compacts_origin() {
        use panelgrid_layout::Section;
        let layout = Layout::from_sections([
            Section::main("main-0", 0)
                .with_panel(Panel::new("a", GridCoordinate::new(0, 0, 4, 2)))
                .with_panel(Panel::new("b", GridCoordinate::new(0, 2, 4, 2))),
            Section::named("s", "S", 1),
        ]);
        let a = layout.find_panel("a").map(|(_, p)| p.clone()).expect("a");
        let next = place_panel(&layout, &a, &"s".into(), GridCoordinate::new(3, 4, 4, 2));

        let main = next.section("main-0").expect("main");
        assert_eq!(main.panels["b"].row, 0);
        let s = next.section("s").expect("s");
        assert_eq!(s.panels["a"].coordinate(), GridCoordinate::new(3, 0, 4, 2));
    }
}
