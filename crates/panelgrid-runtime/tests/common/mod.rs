#![allow(dead_code)]

use std::rc::Rc;

use panelgrid_core::RuntimeSettings;
use panelgrid_layout::{GridCoordinate, Layout, Panel};
use panelgrid_runtime::{CanvasPlacement, ElementMeasurer, GridLayoutState, RectRegistry};

/// A grid state wired to an in-memory measurer laid out from the layout.
pub struct Harness {
    pub state: GridLayoutState,
    pub registry: Rc<RectRegistry>,
}

impl Harness {
    pub fn new(layout: Layout) -> Self {
        let settings = RuntimeSettings::default();
        let registry = Rc::new(RectRegistry::from_layout(
            &layout,
            &settings,
            CanvasPlacement::default(),
        ));
        let measurer: Rc<dyn ElementMeasurer> = registry.clone();
        Self {
            state: GridLayoutState::new(layout, settings, measurer),
            registry,
        }
    }

    /// Re-measure from the canonical layout, as a host does after a render.
    pub fn remeasure(&self) {
        let layout = self.state.layout().get();
        let settings = self.state.settings().get();
        self.registry
            .measure_layout(&layout, &settings, CanvasPlacement::default());
    }
}

pub fn panel(id: &str, column: u32, row: u32, width: u32, height: u32) -> Panel {
    Panel::new(id, GridCoordinate::new(column, row, width, height))
}

pub fn owner(layout: &Layout, panel: &str) -> Option<String> {
    layout
        .find_panel(panel)
        .map(|(section, _)| section.as_str().to_owned())
}
