//! Element measurement seam.
//!
//! The runtime never computes where things are on screen; it asks an
//! [`ElementMeasurer`] for the client rectangle of a panel, a section body,
//! a section header, or the whole canvas. `None` means the element is not
//! mounted and the gesture step is skipped.
//!
//! [`RectRegistry`] is an in-memory measurer that hosts fill from their own
//! layout pass, and that can also lay a [`Layout`] out by itself
//! ([`RectRegistry::from_layout`]), which is how tests drive gestures.

use std::cell::RefCell;
use std::collections::HashMap;

use panelgrid_core::{PixelRect, RuntimeSettings};
use panelgrid_layout::{Layout, SectionId};

/// Source of client rectangles for mounted elements.
pub trait ElementMeasurer {
    /// Rectangle of a rendered panel.
    fn panel_rect(&self, panel: &str) -> Option<PixelRect>;

    /// Rectangle of a section's panel area (its grid body).
    fn section_rect(&self, section: &str) -> Option<PixelRect>;

    /// Rectangle of a named section's header.
    fn header_rect(&self, section: &str) -> Option<PixelRect>;

    /// Rectangle of the whole grid.
    fn canvas_rect(&self) -> Option<PixelRect>;

    /// Bring a section header into view.
    fn scroll_into_view(&self, _section: &str) {}
}

#[derive(Debug, Default)]
struct Rects {
    panels: HashMap<String, PixelRect>,
    sections: HashMap<String, PixelRect>,
    headers: HashMap<String, PixelRect>,
    canvas: Option<PixelRect>,
    scrolled: Vec<SectionId>,
}

/// Placement of the grid used by [`RectRegistry::measure_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPlacement {
    /// Client x of the grid's left edge.
    pub left: f64,
    /// Client y of the grid's top edge.
    pub top: f64,
    /// Height of a named section header.
    pub header_height: f64,
}

impl Default for CanvasPlacement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            header_height: 32.0,
        }
    }
}

/// Interior-mutable map of element rectangles.
#[derive(Debug, Default)]
pub struct RectRegistry {
    rects: RefCell<Rects>,
}

impl RectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the geometry of `layout` as rendered with
    /// `settings` at `placement`.
    #[must_use]
    pub fn from_layout(
        layout: &Layout,
        settings: &RuntimeSettings,
        placement: CanvasPlacement,
    ) -> Self {
        let registry = Self::new();
        registry.measure_layout(layout, settings, placement);
        registry
    }

    /// Replace every rectangle with the geometry of `layout`.
    ///
    /// Sections stack top to bottom in order. Named sections get a header of
    /// `placement.header_height`; collapsed ones contribute only that
    /// header. An expanded section's body is as tall as its rows, and at
    /// least one row so an empty section stays a drop target. Consecutive
    /// blocks are separated by one gutter. Scroll requests are kept.
    pub fn measure_layout(
        &self,
        layout: &Layout,
        settings: &RuntimeSettings,
        placement: CanvasPlacement,
    ) {
        let gutter = settings.gutter_size;
        let width = cell_span(
            settings.column_count,
            settings.column_pixel_width,
            gutter,
        );
        let mut rects = self.rects.borrow_mut();
        rects.panels.clear();
        rects.sections.clear();
        rects.headers.clear();

        let mut top = placement.top;
        for section in layout.sections_in_order() {
            let id = section.id.as_str().to_owned();
            if !section.is_main_section {
                rects.headers.insert(
                    id.clone(),
                    PixelRect::from_origin_size(placement.left, top, width, placement.header_height),
                );
                top += placement.header_height + gutter;
            }
            if !section.is_expanded() {
                continue;
            }

            let body_height = cell_span(section.height(), settings.row_height, gutter)
                .max(settings.row_height);
            rects.sections.insert(
                id,
                PixelRect::from_origin_size(placement.left, top, width, body_height),
            );
            for panel in section.panels.values() {
                rects.panels.insert(
                    panel.id.as_str().to_owned(),
                    PixelRect::from_origin_size(
                        placement.left + f64::from(panel.column) * settings.column_step(),
                        top + f64::from(panel.row) * settings.row_step(),
                        cell_span(panel.width, settings.column_pixel_width, gutter),
                        cell_span(panel.height, settings.row_height, gutter),
                    ),
                );
            }
            top += body_height + gutter;
        }

        let height = (top - gutter - placement.top).max(0.0);
        rects.canvas = Some(PixelRect::from_origin_size(
            placement.left,
            placement.top,
            width,
            height,
        ));
    }

    pub fn set_panel_rect(&self, panel: &str, rect: PixelRect) {
        self.rects.borrow_mut().panels.insert(panel.to_owned(), rect);
    }

    pub fn remove_panel_rect(&self, panel: &str) {
        self.rects.borrow_mut().panels.remove(panel);
    }

    pub fn set_section_rect(&self, section: &str, rect: PixelRect) {
        self.rects
            .borrow_mut()
            .sections
            .insert(section.to_owned(), rect);
    }

    pub fn set_header_rect(&self, section: &str, rect: PixelRect) {
        self.rects
            .borrow_mut()
            .headers
            .insert(section.to_owned(), rect);
    }

    pub fn set_canvas_rect(&self, rect: PixelRect) {
        self.rects.borrow_mut().canvas = Some(rect);
    }

    /// Sections passed to [`ElementMeasurer::scroll_into_view`], oldest first.
    #[must_use]
    pub fn scroll_requests(&self) -> Vec<SectionId> {
        self.rects.borrow().scrolled.clone()
    }
}

impl ElementMeasurer for RectRegistry {
    fn panel_rect(&self, panel: &str) -> Option<PixelRect> {
        self.rects.borrow().panels.get(panel).copied()
    }

    fn section_rect(&self, section: &str) -> Option<PixelRect> {
        self.rects.borrow().sections.get(section).copied()
    }

    fn header_rect(&self, section: &str) -> Option<PixelRect> {
        self.rects.borrow().headers.get(section).copied()
    }

    fn canvas_rect(&self) -> Option<PixelRect> {
        self.rects.borrow().canvas
    }

    fn scroll_into_view(&self, section: &str) {
        self.rects.borrow_mut().scrolled.push(section.into());
    }
}

/// Pixel length of `cells` cells of `size` separated by `gutter`.
fn cell_span(cells: u32, size: f64, gutter: f64) -> f64 {
    if cells == 0 {
        return 0.0;
    }
    f64::from(cells) * size + f64::from(cells - 1) * gutter
}
