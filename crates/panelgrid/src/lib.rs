#![forbid(unsafe_code)]

//! panelgrid public facade.
//!
//! Re-exports the layout model, the resolvers, and the reactive runtime, and
//! offers a small prelude plus a subscriber bootstrap in [`logging`].
//!
//! ```
//! use panelgrid::prelude::*;
//!
//! let layout = Layout::from_sections([Section::main("main-0", 0)
//!     .with_panel(Panel::new("cpu", GridCoordinate::new(0, 0, 24, 8)))]);
//! let (grid, _rects) = headless_grid(layout, RuntimeSettings::default());
//! assert_eq!(grid.phase(), InteractionPhase::Idle);
//! ```

use std::rc::Rc;

pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use panelgrid_core::{
    InteractionInput, NavigationKey, PixelRect, PointerKind, PointerPosition, RuntimeSettings,
    SensorType, SettingsError,
};

// --- Layout re-exports -----------------------------------------------------

pub use panelgrid_layout::{
    EditError, GridCoordinate, Layout, LayoutError, LayoutReport, Panel, PanelId,
    RemoveSectionPolicy, Section, SectionId, is_layout_equal,
};

// --- Runtime re-exports ----------------------------------------------------

pub use panelgrid_runtime::{
    ActivePanel, CanvasPlacement, Derived, ElementMeasurer, GridLayoutState, InteractionOutcome,
    InteractionPhase, NoopReason, Observable, PanelInteraction, PanelState, RectRegistry,
    SectionDragEvent, StateError, Subscription,
};

/// A grid whose element rectangles are computed from the layout itself.
///
/// For hosts without a real renderer to measure (tests, server-side
/// previews). Call [`RectRegistry::measure_layout`] after each committed
/// change to keep the rectangles current.
#[must_use]
pub fn headless_grid(
    layout: Layout,
    settings: RuntimeSettings,
) -> (GridLayoutState, Rc<RectRegistry>) {
    let registry = Rc::new(RectRegistry::from_layout(
        &layout,
        &settings,
        CanvasPlacement::default(),
    ));
    let measurer: Rc<dyn ElementMeasurer> = registry.clone();
    (GridLayoutState::new(layout, settings, measurer), registry)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        GridCoordinate, GridLayoutState, InteractionInput, InteractionOutcome, InteractionPhase,
        Layout, NavigationKey, Panel, RuntimeSettings, Section, headless_grid,
    };

    pub use crate::{core, layout, runtime};
}

pub use panelgrid_core as core;
pub use panelgrid_layout as layout;
pub use panelgrid_runtime as runtime;
